//! The six stage views, one submodule each.
//!
//! Every stage is an independent unit: it owns only its working copy, reads
//! session state handed to it by the driver, and produces a typed
//! [`crate::controller::StageOutput`] (or, for export, an outcome). Keeping
//! stages separate makes each independently testable and substitutable;
//! none knows the others exist, and only the controller stitches their
//! outputs into the session.
//!
//! ## Data Flow
//!
//! ```text
//! intake ──▶ extraction ──▶ selection ──▶ mapping ──▶ review ──▶ export
//! (docs+type)  (remote OCR,    (sample /     (local      (local     (fill-pdf /
//!              then edit)      upload / url)  edits)      confirm)    fill-url)
//! ```
//!
//! Only [`extraction`], [`selection`] (upload path), and [`export`] touch
//! the network, and each routes every call through [`crate::gateway::FormApi`].

pub mod export;
pub mod extraction;
pub mod intake;
pub mod mapping;
pub mod review;
pub mod selection;
