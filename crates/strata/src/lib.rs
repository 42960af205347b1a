#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use strata_image as image;

#[doc(inline)]
pub use strata_imgproc as imgproc;

#[doc(inline)]
pub use strata_io as io;
