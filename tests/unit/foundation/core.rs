use super::*;

#[test]
fn frame_range_iterates_half_open() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert_eq!(r.len_frames(), 3);
    let frames: Vec<_> = r.iter().collect();
    assert_eq!(frames, vec![FrameIndex(2), FrameIndex(3), FrameIndex(4)]);

    let empty = FrameRange::new(FrameIndex(7), FrameIndex(7)).unwrap();
    assert_eq!(empty.len_frames(), 0);
    assert_eq!(empty.iter().count(), 0);
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(matches!(
        FrameRange::new(FrameIndex(3), FrameIndex(2)),
        Err(YuvcompError::Validation(_))
    ));
}

#[test]
fn canvas_bounds() {
    assert!(matches!(Canvas::new(0, 10), Err(YuvcompError::Invariant(_))));
    assert!(matches!(
        Canvas::new(10, MAX_CANVAS_DIM + 1),
        Err(YuvcompError::Invariant(_))
    ));
    assert!(Canvas::new(MAX_CANVAS_DIM, 1).is_ok());
    assert_eq!(
        Canvas::new(1918, 1080).unwrap(),
        Canvas {
            width: 1918,
            height: 1080
        }
    );
}
