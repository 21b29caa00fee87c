// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::KIND_CONTEXT_PREFIX;
use crate::error::{Result, UbikindError};
use std::fmt;
use std::str::FromStr;

const MAX_POD_NAME_LEN: usize = 253;

/// Name of a Kind cluster, matching `^[a-z0-9.-]+$`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClusterName(String);

impl ClusterName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let valid = !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'-');

        if valid {
            Ok(Self(name))
        } else {
            Err(UbikindError::InvalidClusterName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The kubeconfig context Kind writes for this cluster
    pub fn kube_context(&self) -> String {
        format!("{}{}", KIND_CONTEXT_PREFIX, self.0)
    }
}

/// Name of a pod, a lowercase DNS-1123 subdomain
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PodName(String);

impl PodName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if is_dns_subdomain(&name) {
            Ok(Self(name))
        } else {
            Err(UbikindError::InvalidPodName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_dns_subdomain(name: &str) -> bool {
    let bytes = name.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };

    bytes.len() <= MAX_POD_NAME_LEN
        && first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-' || *b == b'.')
}

/// Reject port 0 and anything outside the u16 range
pub fn validate_port(port: u32) -> Result<u16> {
    match u16::try_from(port) {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(UbikindError::InvalidPort(port)),
    }
}

impl FromStr for ClusterName {
    type Err = UbikindError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl FromStr for PodName {
    type Err = UbikindError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for ClusterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
