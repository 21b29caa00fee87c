// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod access;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod error;
pub mod forward;
pub mod kubernetes;
pub mod orchestrator;
pub mod process;
pub mod types;

#[cfg(test)]
pub mod test_utils;
