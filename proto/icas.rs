//! `buildbarn.icas`: the Indirect Content Addressable Storage protocol.
//!
//! Instead of blob contents, the ICAS stores references that describe where
//! an object can be found in an external corpus.

use crate::re::Digest;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Reference {
    #[prost(oneof = "reference::Medium", tags = "1")]
    pub medium: Option<reference::Medium>,
    #[prost(int64, tag = "2")]
    pub offset_bytes: i64,
    #[prost(int64, tag = "3")]
    pub size_bytes: i64,
}

pub mod reference {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Medium {
        #[prost(string, tag = "1")]
        HttpUrl(String),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetReferenceRequest {
    #[prost(string, tag = "1")]
    pub instance_name: String,
    #[prost(message, optional, tag = "2")]
    pub digest: Option<Digest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchUpdateReferencesRequest {
    #[prost(string, tag = "1")]
    pub instance_name: String,
    #[prost(message, repeated, tag = "2")]
    pub requests: Vec<batch_update_references_request::Request>,
}

pub mod batch_update_references_request {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Request {
        #[prost(message, optional, tag = "1")]
        pub digest: Option<crate::re::Digest>,
        #[prost(message, optional, tag = "2")]
        pub reference: Option<super::Reference>,
    }
}

include!(concat!(
    env!("OUT_DIR"),
    "/buildbarn.icas.IndirectContentAddressableStorage.rs"
));
