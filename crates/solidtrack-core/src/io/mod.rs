pub mod crop;
pub mod image_io;
pub mod ser;
pub mod source;
pub mod tiff_stack;

pub use crop::CropBox;
pub use image_io::ImageSequence;
pub use ser::SerReader;
pub use source::{
    load_frame, open_source, source_info, CroppedSource, FrameSource, MemoryStack,
};
pub use tiff_stack::TiffStack;
