//! Headshop Storefront - cart, pricing, caching, and admin workflow engine.
//!
//! This crate is the client-side logic of the storefront, independent of any
//! rendering layer. A UI subscribes to the owned stores (cart, product
//! mirror, shipping state, notices) via their `watch` channels and calls the
//! operations on [`session::StorefrontSession`]; nothing in here knows how
//! pixels get drawn.
//!
//! # Architecture
//!
//! - [`backend`] - persistence-service client (REST) behind the
//!   [`backend::ProductBackend`] trait
//! - [`cache`] - read-through product cache with a synchronous local mirror
//! - [`cart`] - SKU -> quantity map with the stock-bound invariant
//! - [`pricing`] - pure totals computation
//! - [`shipping`] - shipping-quote client and quote/selection state
//! - [`carousel`] - banner and related-products index state machines
//! - [`admin`] - inventory editor workflow and the pluggable admin gate
//! - [`session`] - orchestrator tying the stores together
//!
//! # Concurrency
//!
//! Single-writer, event-driven: only the owning event loop mutates the
//! stores. Interior mutability exists so the stores can be shared across
//! await points, not to support parallel writers. Timers are modeled as
//! deadlines checked by explicit `tick(now)` calls; owners simply stop
//! ticking on teardown.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod backend;
pub mod cache;
pub mod carousel;
pub mod cart;
pub mod config;
pub mod error;
pub mod notice;
pub mod notify;
pub mod pricing;
pub mod session;
pub mod shipping;

pub use error::{Result, StoreError};
