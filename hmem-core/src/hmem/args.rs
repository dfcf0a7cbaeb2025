use crate::error::{Error, ErrorKind, ErrorOrigin, Result};

use super::HmemIface;

use std::collections::HashMap;
use std::convert::TryFrom;

/// Name of the environment variable read by [`HmemArgs::from_env`].
pub const HMEM_ARGS_ENV: &str = "HMEM_IFACES";

/// Argument wrapper for configuring a [`HmemContext`](super::HmemContext).
///
/// Every key names a device memory kind, its value turns the kind on or off.
/// A bare leading value is stored under the `default` key and applies to every
/// device kind without an explicit entry. A disabled kind is never initialized.
///
/// # Examples
///
/// Construct from a string:
/// ```
/// use hmem_core::hmem::{HmemArgs, HmemIface};
/// use std::convert::TryFrom;
///
/// let argstr = "off,ze=on";
/// let args = HmemArgs::try_from(argstr).unwrap();
/// assert_eq!(args.is_enabled(HmemIface::Cuda).unwrap(), false);
/// assert_eq!(args.is_enabled(HmemIface::Ze).unwrap(), true);
/// assert_eq!(args.is_enabled(HmemIface::System).unwrap(), true);
/// ```
///
/// Construct as builder:
/// ```
/// use hmem_core::hmem::HmemArgs;
///
/// let args = HmemArgs::new()
///     .insert("cuda", "off")
///     .insert("rocr", "on");
/// ```
#[derive(Clone, Debug)]
pub struct HmemArgs {
    map: HashMap<String, String>,
}

impl HmemArgs {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Creates arguments with a switch for all device kinds.
    pub fn with_default(value: &str) -> Self {
        Self::new().insert("default", value)
    }

    pub fn try_parse_str(args: &str) -> Result<Self> {
        let mut map = HashMap::new();

        for (i, kv) in args.split(',').enumerate() {
            let kv = kv.trim();
            if kv.is_empty() {
                continue;
            }

            let kvsplit = kv.split('=').collect::<Vec<_>>();
            if kvsplit.len() == 2 {
                map.insert(
                    kvsplit[0].trim().to_lowercase(),
                    kvsplit[1].trim().to_string(),
                );
            } else if i == 0 && kvsplit.len() == 1 {
                map.insert("default".to_string(), kv.to_string());
            } else {
                return Err(Error(ErrorOrigin::Args, ErrorKind::ArgValidation)
                    .log_warn(format!("malformed argument `{}`", kv)));
            }
        }

        Ok(Self { map })
    }

    /// Reads the arguments from the `HMEM_IFACES` environment variable.
    ///
    /// An unset variable results in empty arguments.
    pub fn from_env() -> Result<Self> {
        match std::env::var(HMEM_ARGS_ENV) {
            Ok(args) => Self::try_parse_str(&args),
            Err(std::env::VarError::NotPresent) => Ok(Self::new()),
            Err(_) => Err(Error(ErrorOrigin::Args, ErrorKind::ArgValidation)
                .log_warn(format!("{} is not valid unicode", HMEM_ARGS_ENV))),
        }
    }

    pub fn insert(mut self, key: &str, value: &str) -> Self {
        self.map.insert(key.to_lowercase(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.map.get(key)
    }

    pub fn get_default(&self) -> Option<&String> {
        self.get("default")
    }

    /// Checks that every key names a known memory kind and every value is a valid switch.
    ///
    /// The host kind can not be turned off.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.map.iter() {
            if key == "default" {
                parse_switch(value)?;
                continue;
            }

            let iface = key.parse::<HmemIface>().map_err(|_| {
                Error(ErrorOrigin::Args, ErrorKind::ArgNotExists)
                    .log_warn(format!("unknown memory kind `{}`", key))
            })?;

            if !parse_switch(value)? && iface == HmemIface::System {
                return Err(Error(ErrorOrigin::Args, ErrorKind::ArgValidation)
                    .log_warn("system memory can not be disabled"));
            }
        }

        Ok(())
    }

    /// Returns wether the given memory kind is enabled.
    ///
    /// Device kinds without an explicit setting follow the `default` switch,
    /// everything else is enabled.
    pub fn is_enabled(&self, iface: HmemIface) -> Result<bool> {
        match self.get(iface.to_str()) {
            Some(value) => parse_switch(value),
            None if iface.is_device() => self.get_default().map_or(Ok(true), |v| parse_switch(v)),
            None => Ok(true),
        }
    }
}

fn parse_switch(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "on" | "1" | "true" | "yes" => Ok(true),
        "off" | "0" | "false" | "no" => Ok(false),
        _ => Err(Error(ErrorOrigin::Args, ErrorKind::ArgValidation)
            .log_warn(format!("`{}` is neither on nor off", value))),
    }
}

impl Default for HmemArgs {
    fn default() -> Self {
        HmemArgs::new()
    }
}

impl TryFrom<&str> for HmemArgs {
    type Error = Error;

    fn try_from(args: &str) -> Result<Self> {
        HmemArgs::try_parse_str(args)
    }
}
