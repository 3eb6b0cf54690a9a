pub mod annotator;
pub mod sink;

pub use annotator::{annotate_image, render_hud, AnnotatedFrame};
pub use sink::{AnnotatorSink, ChannelSink};
