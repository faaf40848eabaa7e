use super::*;

#[test]
fn infers_prefix_and_width() {
    let p = SeqPattern::from_path(Path::new("/x/clip_a_0007.yuv")).unwrap();
    assert_eq!(p.prefix, "clip_a_");
    assert_eq!(p.digits, 4);
    assert_eq!(p.ext, "yuv");
    assert_eq!(p.file_name(12), "clip_a_0012.yuv");
    assert_eq!(p.index_of("clip_a_0099.yuv"), Some(99));
    assert_eq!(p.index_of("clip_a_099.yuv"), None);
    assert_eq!(p.index_of("clip_b_0099.yuv"), None);
    assert_eq!(p.index_of("clip_a_0099.json"), None);
}

#[test]
fn rejects_names_without_trailing_number() {
    for bad in ["clip.yuv", "clip_.yuv", "clip_12a.yuv", "clip_12"] {
        assert!(SeqPattern::from_path(Path::new(bad)).is_err(), "{bad}");
    }
}

#[test]
fn lists_sorted_matching_files() {
    let dir = Path::new("target/fileseq_list");
    let _ = std::fs::remove_dir_all(dir);
    std::fs::create_dir_all(dir).unwrap();
    for name in ["b_01.yuv", "a_02.yuv", "a_01.yuv", "notes.txt"] {
        std::fs::write(dir.join(name), b"").unwrap();
    }
    let files = list_files_with_ext(dir, "yuv").unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, ["a_01.yuv", "a_02.yuv", "b_01.yuv"]);

    assert!(list_files_with_ext(Path::new("target/fileseq_missing_dir"), "yuv").is_err());
}
