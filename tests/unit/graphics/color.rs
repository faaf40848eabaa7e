use super::*;

#[test]
fn parses_hex_forms() {
    assert_eq!(
        CssColor::parse("#ff0000").unwrap(),
        CssColor::rgba(1.0, 0.0, 0.0, 1.0)
    );
    assert_eq!(
        CssColor::parse("#fff").unwrap(),
        CssColor::rgba(1.0, 1.0, 1.0, 1.0)
    );
    let c = CssColor::parse("#0000ff80").unwrap();
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);
}

#[test]
fn parses_functional_forms() {
    let c = CssColor::parse("rgba(255, 0, 51, 0.5)").unwrap();
    assert_eq!(c.to_rgba8(1.0), [255, 0, 51, 128]);
    let c = CssColor::parse("rgb(0,255,0)").unwrap();
    assert_eq!(c.to_rgba8(0.5), [0, 255, 0, 128]);
}

#[test]
fn rejects_garbage() {
    assert!(CssColor::parse("#12").is_err());
    assert!(CssColor::parse("rgb(1,2)").is_err());
    assert!(CssColor::parse("chartreuse-ish").is_err());
}
