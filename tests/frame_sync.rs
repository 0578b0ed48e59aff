use image::RgbImage;
use reflex_viz::video::{synchronized_frame, Frame};

/// Endless stream that counts how often it is pulled.
struct CountingStream {
    reads: usize,
}

impl Iterator for CountingStream {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let index = self.reads as u64;
        self.reads += 1;
        Some(Frame {
            image: RgbImage::new(2, 2),
            time: index as f64 / 60.0,
            index,
        })
    }
}

#[test]
fn test_reads_per_primary_frame() {
    for (primary_index, expected) in [(1, 3), (2, 3), (3, 4), (6, 4), (7, 3)] {
        let mut stream = CountingStream { reads: 0 };
        let frame = synchronized_frame(&mut stream, primary_index).unwrap();
        assert_eq!(stream.reads, expected, "primary frame {}", primary_index);
        assert_eq!(frame.index, expected as u64 - 1);
    }
}

#[test]
fn test_empty_stream_yields_nothing() {
    let mut stream = std::iter::empty::<Frame>();
    assert!(synchronized_frame(&mut stream, 1).is_none());
}
