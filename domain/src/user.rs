pub use entity_api::user::{
    create, find_by_email, find_by_id, generate_hash, AuthSession, Backend, Credentials,
};
