//! Palette types, construction and nearest-color matching
//!
//! [`PaletteBuilder`] reduces an image's [`ColorHistogram`] to a
//! [`Palette`]; the palette then answers nearest-color queries in Lab for
//! the ditherer.

mod builder;
mod error;
mod histogram;
mod options;
mod palette;

pub use builder::PaletteBuilder;
pub use error::{PaletteError, ParseColorError};
pub use histogram::{ColorHistogram, HistogramEntry, MAX_SAMPLED_PIXELS};
pub use options::{QuantizationParameters, EMBROIDERY_INTENSITY_CAP, MIN_COLOR_COUNT};
pub use palette::{Palette, MAX_PALETTE_LEN};
