//! Call of Duty: Black Ops II (T6)

use super::{
    AddressDerivation, AssetType, PoolLayout, Sentinel, SignatureSpec, SlotPolicy,
    TitleDescriptor,
};
use crate::asset::rawfile::BlackOps2RawFile;
use crate::memory::PointerWidth;

pub const XMODEL: u32 = 5;
pub const RAWFILE: u32 = 41;

pub static BLACK_OPS_2: TitleDescriptor = TitleDescriptor {
    id: "bo2",
    name: "Black Ops II",
    process_names: &["t6sp", "t6mp", "t6zm"],
    pointer_width: PointerWidth::Bits32,
    signatures: &[SignatureSpec {
        pattern: "56 51 FF D2 8B F0 83 C4 04 85 F6",
        pools: AddressDerivation::Absolute32 { offset: -0xB },
        pool_sizes: Some(AddressDerivation::Absolute32 { offset: 0x3B }),
    }],
    layout: PoolLayout::PointerTable,
    slot_policy: SlotPolicy::NullOrFreeListLink,
    asset_types: ASSET_TYPES,
    // defaultvehicle is always the first xmodel loaded
    sentinel: Sentinel {
        type_index: XMODEL,
        expected: "defaultvehicle",
    },
    handlers: &[&BlackOps2RawFile],
};

static ASSET_TYPES: &[AssetType] = &[
    AssetType::new("xmodelpieces", 0),
    AssetType::new("physpreset", 1),
    AssetType::new("physconstraints", 2),
    AssetType::new("destructibledef", 3),
    AssetType::new("xanim", 4),
    AssetType::new("xmodel", 5),
    AssetType::new("material", 6),
    AssetType::new("techset", 7),
    AssetType::new("image", 8),
    AssetType::new("sound", 9),
    AssetType::new("sound_patch", 10),
    AssetType::new("col_map_sp", 11),
    AssetType::new("col_map_mp", 12),
    AssetType::new("com_map", 13),
    AssetType::new("game_map_sp", 14),
    AssetType::new("game_map_mp", 15),
    AssetType::new("map_ents", 16),
    AssetType::new("gfx_map", 17),
    AssetType::new("lightdef", 18),
    AssetType::new("ui_map", 19),
    AssetType::new("font", 20),
    AssetType::new("fonticon", 21),
    AssetType::new("menufile", 22),
    AssetType::new("menu", 23),
    AssetType::new("localize", 24),
    AssetType::new("weapon", 25),
    AssetType::new("weapondef", 26),
    AssetType::new("weaponvariant", 27),
    AssetType::new("weaponfull", 28),
    AssetType::new("attachment", 29),
    AssetType::new("attachmentunique", 30),
    AssetType::new("weaponcamo", 31),
    AssetType::new("snddriverglobals", 32),
    AssetType::new("fx", 33),
    AssetType::new("impactfx", 34),
    AssetType::new("aitype", 35),
    AssetType::new("mptype", 36),
    AssetType::new("mpbody", 37),
    AssetType::new("mphead", 38),
    AssetType::new("character", 39),
    AssetType::new("xmodelalias", 40),
    AssetType::new("rawfile", 41),
    AssetType::new("stringtable", 42),
    AssetType::new("leaderboarddef", 43),
    AssetType::new("xGlobals", 44),
    AssetType::new("ddl", 45),
    AssetType::new("glasses", 46),
    AssetType::new("emblemset", 47),
    AssetType::new("scriptparsetree", 48),
    AssetType::new("keyvaluepairs", 49),
    AssetType::new("vehicle", 50),
    AssetType::new("memoryblock", 51),
    AssetType::new("addon_map_ents", 52),
    AssetType::new("tracer", 53),
    AssetType::new("skinnedverts", 54),
    AssetType::new("qdb", 55),
    AssetType::new("slug", 56),
    AssetType::new("footsteptable", 57),
    AssetType::new("footstepfxtable", 58),
    AssetType::new("zbarrier", 59),
    AssetType::new("string", 60),
    AssetType::new("assetlist", 61),
    AssetType::new("report", 62),
    AssetType::new("depend", 63),
];
