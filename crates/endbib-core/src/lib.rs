//! endbib-core: the data model shared by the EndNote reader, the BibTeX writer
//! and the conversion driver.
//!
//! Records come out of the reader as [`RawRecord`]s whose values may carry
//! EndNote's inline [`StyledText`] markup. The mapper turns them into
//! [`MappedEntry`]s holding [`FieldText`], and the writer serializes those.
//! Everything that goes wrong along the way without aborting the document is
//! reported as a [`ConversionWarning`] inside the [`ConversionResult`].

mod entry;
mod error;
mod fidelity;
mod options;
mod record;
mod styled;

pub use entry::*;
pub use error::*;
pub use fidelity::*;
pub use options::*;
pub use record::*;
pub use styled::*;
