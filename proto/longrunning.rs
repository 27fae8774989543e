//! The subset of `google.longrunning` returned by the Execution service.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Operation {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub metadata: Option<::prost_types::Any>,
    #[prost(bool, tag = "3")]
    pub done: bool,
    #[prost(oneof = "operation::Result", tags = "4, 5")]
    pub result: Option<operation::Result>,
}

pub mod operation {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "4")]
        Error(crate::rpc::Status),
        #[prost(message, tag = "5")]
        Response(::prost_types::Any),
    }
}
