//! Test-only helpers for laying out a gen-srg project on disk.

use std::fs;
use std::path::Path;

use crate::core::srg::RenameDictionary;
use crate::gen_srg::GenSrg;
use crate::io::config::GenSrgConfig;

/// Mapping table covering every record kind, including type tokens.
pub const JOINED_SRG: &str = "\
PK: ./ net/minecraft/src
CL: a net/minecraft/src/Entity
CL: 0 b net/minecraft/src/World
FD: a/a net/minecraft/src/Entity/field_70165_t
FD: 2 b/c net/minecraft/src/World/field_72995_K
MD: a/b (D)V net/minecraft/src/Entity/func_70107_b (D)V
MD: 1 b/d ()Z net/minecraft/src/World/func_72896_J ()Z
MD: a/e ()V net/minecraft/src/Entity/func_70030_z ()V
";

pub const FIELDS_CSV: &str = "\
searge,name,side,desc
field_70165_t,posX,2,Entity position
field_72995_K,isRemote,2,\"True for client worlds, false for server\"
";

pub const METHODS_CSV: &str = "\
searge,name,side,desc
func_70107_b,setPosition,2,
func_72896_J,isRaining,2,
";

/// Write `conf/joined.srg`, `conf/fields.csv` and `conf/methods.csv` under
/// `root` and return the work item using the default layout.
pub fn write_fixture(root: &Path) -> GenSrg {
    let conf = root.join("conf");
    fs::create_dir_all(&conf).expect("create conf");
    fs::write(conf.join("joined.srg"), JOINED_SRG).expect("write joined.srg");
    fs::write(conf.join("fields.csv"), FIELDS_CSV).expect("write fields.csv");
    fs::write(conf.join("methods.csv"), METHODS_CSV).expect("write methods.csv");
    GenSrg::from_config(&GenSrgConfig::default(), root)
}

/// Read a file as UTF-8, panicking with the path on failure.
pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}

/// Build a rename dictionary from pairs, panicking on a duplicate short name.
pub fn dictionary(pairs: &[(&str, &str)]) -> RenameDictionary {
    let mut dict = RenameDictionary::new();
    for (short, final_name) in pairs {
        if let Err(existing) = dict.insert(short.to_string(), final_name.to_string()) {
            panic!("duplicate short name {short} (already maps to {existing})");
        }
    }
    dict
}
