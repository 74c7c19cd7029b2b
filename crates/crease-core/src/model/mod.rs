// ── Domain model ──
//
// Records themselves stay opaque JSON; the model only covers identity and
// the catalogue of backend collections.

pub mod record_id;
pub mod resource;

pub use record_id::RecordId;
pub use resource::Resource;
