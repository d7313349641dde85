//! Language-agnostic intermediate representation.
//!
//! Loaders produce a [`TypeUniverse`] of resolved types; the analyzer turns the
//! interfaces reachable from a set of roots into a [`ContractGraph`] that the
//! stub generator consumes.

mod contract;
mod types;

pub use contract::{ContractGraph, ContractId, InterfaceContract, Method, Var};
pub use types::{
    ChanDir, Field, InterfaceType, MethodSig, NamedType, Param, Primitive, Signature,
    TypeDescriptor, TypeId, TypeUniverse, ERROR_METHOD,
};
