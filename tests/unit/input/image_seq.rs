use super::*;

fn write_seq(name: &str, first: u64, count: u64, w: u32, h: u32) -> PathBuf {
    let dir = PathBuf::from("target").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let size = Yuv420Layout::dense(w, h).data_size();
    for i in first..first + count {
        std::fs::write(dir.join(format!("cam_{i:04}.yuv")), vec![i as u8; size]).unwrap();
    }
    dir
}

#[test]
fn zero_based_sequence_loops() {
    let dir = write_seq("image_seq_zero", 0, 3, 4, 2);
    let seq = ImageSequence::open(&dir, 4, 2).unwrap();
    assert_eq!(seq.frame_count(), 3);
    assert!(!seq.starts_at_one());
    assert_eq!(seq.read_frame(1).unwrap().data()[0], 1);
    assert_eq!(seq.read_frame(4).unwrap().data()[0], 1);
    assert_eq!(seq.read_frame(3).unwrap().data().len(), 4 * 2 + 2 * 2);
}

#[test]
fn one_based_sequence_is_detected() {
    let dir = write_seq("image_seq_one", 1, 2, 2, 2);
    let seq = ImageSequence::open(&dir, 2, 2).unwrap();
    assert!(seq.starts_at_one());
    assert_eq!(seq.frame_count(), 2);
    assert_eq!(seq.read_frame(0).unwrap().data()[0], 1);
    assert_eq!(seq.read_frame(2).unwrap().data()[0], 1);
    assert!(seq.frame_path(1).ends_with("cam_0002.yuv"));
}

#[test]
fn probing_stops_at_first_gap() {
    let dir = write_seq("image_seq_gap", 0, 2, 2, 2);
    std::fs::write(dir.join("cam_0003.yuv"), vec![0u8; 6]).unwrap();
    let seq = ImageSequence::open(&dir, 2, 2).unwrap();
    assert_eq!(seq.frame_count(), 2);
}

#[test]
fn short_frame_is_a_resource_error() {
    let dir = write_seq("image_seq_short", 0, 1, 4, 4);
    let seq = ImageSequence::open(&dir, 8, 8).unwrap();
    assert!(matches!(seq.read_frame(0), Err(YuvcompError::Resource(_))));
}

#[test]
fn missing_frames_fail_to_open() {
    let dir = write_seq("image_seq_none", 5, 1, 2, 2);
    assert!(matches!(
        ImageSequence::open(&dir, 2, 2),
        Err(YuvcompError::Resource(_))
    ));
    assert!(ImageSequence::open("target/image_seq_absent_dir", 2, 2).is_err());
    assert!(ImageSequence::open(&dir, 0, 2).is_err());
}
