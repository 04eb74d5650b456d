//! Product draft domain model.

mod model;

pub use model::{
    AttributePair, DetailPatch, GeneratedContent, ImageRef, ImageSource, MetaField, ProductDraft,
};
