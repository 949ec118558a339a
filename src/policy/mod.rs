pub mod lru;
pub mod lru_k;
