//! Low-level container access, pure Rust.
//!
//! | Concern | Implementation |
//! |---|---|
//! | **Container detection** | magic bytes ([`Container::sniff`]) |
//! | **IPTC-IIM block** | custom parser (JPEG APP13 + TIFF IFD) |
//! | **EXIF block** | `kamadak-exif`, driven from [`crate::exif`] |

mod container;
pub(crate) mod iptc_parser;

pub use container::{ByteOrder, Container};
