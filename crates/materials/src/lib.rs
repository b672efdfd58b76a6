//! Course materials domain module (event-sourced).

pub mod material;

pub use material::{
    Material, MaterialCommand, MaterialEvent, MaterialId, MaterialRemoved, MaterialUploaded,
    RemoveMaterial, UploadMaterial,
};
