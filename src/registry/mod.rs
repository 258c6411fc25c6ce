// Keyrack — Platform Schema Registry
//
// Fixed, read-only catalog of supported platforms. Each schema declares the
// display name and the ordered list of credential fields a record must carry.

mod catalog;
mod schema;

pub use catalog::PlatformSchemaRegistry;
pub use schema::PlatformSchema;
