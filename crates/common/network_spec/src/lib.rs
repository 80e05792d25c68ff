pub mod b32_hex;
pub mod spec;

pub use spec::{DEV, HOODI, MAINNET, Network, NetworkSpec, SEPOLIA, preset_from_name};

#[cfg(test)]
mod tests {
    #[test]
    fn presets_resolve_from_the_crate_root() {
        let spec = crate::preset_from_name("dev").unwrap();
        assert_eq!(spec.network, crate::Network::Dev);
        assert!(crate::preset_from_name("holesky").is_err());
    }
}
