mod client;
mod model;
mod repository;

pub use client::{ContentClient, ContentPayload, ContentQuery};
pub use model::{AboutRecord, ContactRecord, MediaKind, MediaRecord, ProjectRecord};
pub use repository::{ContentError, FsRepository};
