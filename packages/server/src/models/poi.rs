use serde::Deserialize;

pub use crate::store::{NewPoi, PoiDeletion, PoiPatch, PoiView};

#[derive(Deserialize)]
pub struct VipCountRequest {
    pub vip_count: i64,
}
