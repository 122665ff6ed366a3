use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::debug;

use crate::error::{Result, TrackError};
use crate::frame::{Frame, SourceInfo};

use super::crop::CropBox;
use super::image_io::ImageSequence;
use super::ser::SerReader;
use super::tiff_stack::TiffStack;

/// Anything that can hand out decoded frames by index.
///
/// Implementations return frames normalized to [0.0, 1.0] and fail with
/// `FrameIndexOutOfRange` for `index >= frame_count()`.
pub trait FrameSource: Send + Sync {
    fn frame_count(&self) -> usize;

    /// `(height, width)` of every frame.
    fn dimensions(&self) -> (usize, usize);

    fn read_frame(&self, index: usize) -> Result<Frame>;

    /// Short format name for display.
    fn format_name(&self) -> &'static str {
        "unknown"
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn frame_count(&self) -> usize {
        (**self).frame_count()
    }

    fn dimensions(&self) -> (usize, usize) {
        (**self).dimensions()
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        (**self).read_frame(index)
    }

    fn format_name(&self) -> &'static str {
        (**self).format_name()
    }
}

pub(crate) fn check_index(index: usize, total: usize) -> Result<()> {
    if index >= total {
        return Err(TrackError::FrameIndexOutOfRange { index, total });
    }
    Ok(())
}

/// Frames held in memory. All frames must share one shape.
#[derive(Clone, Debug)]
pub struct MemoryStack {
    frames: Vec<Array2<f32>>,
    bit_depth: u8,
}

impl MemoryStack {
    pub fn new(frames: Vec<Array2<f32>>) -> Result<Self> {
        let first = frames.first().ok_or(TrackError::EmptySequence)?.dim();
        if let Some(bad) = frames.iter().find(|f| f.dim() != first) {
            return Err(TrackError::ShapeMismatch {
                expected: first,
                actual: bad.dim(),
            });
        }
        Ok(Self {
            frames,
            bit_depth: 32,
        })
    }
}

impl FrameSource for MemoryStack {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn dimensions(&self) -> (usize, usize) {
        self.frames[0].dim()
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        check_index(index, self.frames.len())?;
        let mut frame = Frame::new(self.frames[index].clone(), self.bit_depth);
        frame.metadata.frame_index = index;
        Ok(frame)
    }

    fn format_name(&self) -> &'static str {
        "memory"
    }
}

/// A source view that crops every frame it reads.
pub struct CroppedSource<S> {
    inner: S,
    crop: Option<CropBox>,
}

impl<S: FrameSource> CroppedSource<S> {
    /// Wrap `inner`, validating the crop against its frame dimensions up front.
    pub fn new(inner: S, crop: Option<CropBox>) -> Result<Self> {
        if let Some(c) = crop {
            let (h, w) = inner.dimensions();
            c.validate(w, h)?;
        }
        Ok(Self { inner, crop })
    }

    pub fn crop(&self) -> Option<CropBox> {
        self.crop
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: FrameSource> FrameSource for CroppedSource<S> {
    fn frame_count(&self) -> usize {
        self.inner.frame_count()
    }

    fn dimensions(&self) -> (usize, usize) {
        match self.crop {
            Some(c) => (c.height(), c.width()),
            None => self.inner.dimensions(),
        }
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        let frame = self.inner.read_frame(index)?;
        match self.crop {
            Some(c) => c.apply(&frame),
            None => Ok(frame),
        }
    }

    fn format_name(&self) -> &'static str {
        self.inner.format_name()
    }
}

/// Open a frame source, choosing the decoder from the path.
///
/// Directories become an [`ImageSequence`], `.ser` files a [`SerReader`],
/// `.tif`/`.tiff` files a [`TiffStack`].
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    if path.is_dir() {
        debug!(path = %path.display(), "Opening image sequence");
        return Ok(Box::new(ImageSequence::open(path)?));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("ser") => {
            debug!(path = %path.display(), "Opening SER file");
            Ok(Box::new(SerReader::open(path)?))
        }
        Some("tif" | "tiff") => {
            debug!(path = %path.display(), "Opening TIFF stack");
            Ok(Box::new(TiffStack::open(path)?))
        }
        _ => Err(TrackError::UnsupportedFormat(format!(
            "cannot open {} as a frame stack",
            path.display()
        ))),
    }
}

/// Describe a source for display.
pub fn source_info(path: &Path, source: &dyn FrameSource) -> SourceInfo {
    let (height, width) = source.dimensions();
    SourceInfo {
        path: PathBuf::from(path),
        total_frames: source.frame_count(),
        width,
        height,
        format: source.format_name(),
    }
}

/// Load frame `index` from the stack at `path`, optionally cropped.
///
/// Opens the stack on every call; hold a [`CroppedSource`] instead when
/// reading many frames.
pub fn load_frame(index: usize, path: &Path, crop: Option<CropBox>) -> Result<Frame> {
    let source = open_source(path)?;
    let frame = source.read_frame(index)?;
    match crop {
        Some(c) => c.apply(&frame),
        None => Ok(frame),
    }
}
