//! Call of Duty: Modern Warfare (2019)

use super::{
    AddressDerivation, AssetType, PoolLayout, Sentinel, SignatureSpec, SlotPolicy,
    TitleDescriptor,
};
use crate::asset::rawfile::ModernWarfareRawFile;
use crate::memory::PointerWidth;

pub const XMODEL: u32 = 9;
pub const RAWFILE: u32 = 51;

pub static MODERN_WARFARE: TitleDescriptor = TitleDescriptor {
    id: "mw",
    name: "Modern Warfare",
    process_names: &["ModernWarfare"],
    pointer_width: PointerWidth::Bits64,
    signatures: &[SignatureSpec {
        pattern: "48 8D 04 40 4C 8D 8E ?? ?? ?? ?? 4D 8D 0C C1 8D 42 FF",
        pools: AddressDerivation::ModuleRelative32 { offset: 7 },
        pool_sizes: None,
    }],
    layout: PoolLayout::Records,
    slot_policy: SlotPolicy::NullName,
    asset_types: ASSET_TYPES,
    // axis_guide_createfx is always the first xmodel loaded
    sentinel: Sentinel {
        type_index: XMODEL,
        expected: "axis_guide_createfx",
    },
    handlers: &[&ModernWarfareRawFile],
};

// Ordinals are not contiguous: 20, 31, 42 and 50 are unused, while tacgraph
// and map_ents share 29 and gfx_map and gfx_map_trzone share 32.
static ASSET_TYPES: &[AssetType] = &[
    AssetType::new("physicslibrary", 0),
    AssetType::new("physicssfxeventasset", 1),
    AssetType::new("physicsvfxeventasset", 2),
    AssetType::new("physicsasset", 3),
    AssetType::new("physicsfxpipeline", 4),
    AssetType::new("physicsfxshape", 5),
    AssetType::new("physicsdebugdata", 6),
    AssetType::new("xanim", 7),
    AssetType::new("xmodelsurfs", 8),
    AssetType::new("xmodel", 9),
    AssetType::new("mayhem", 10),
    AssetType::new("material", 11),
    AssetType::new("computeshader", 12),
    AssetType::new("libshader", 13),
    AssetType::new("vertexshader", 14),
    AssetType::new("hullshader", 15),
    AssetType::new("domainshader", 16),
    AssetType::new("pixelshader", 17),
    AssetType::new("techset", 18),
    AssetType::new("image", 19),
    AssetType::new("soundglobals", 21),
    AssetType::new("soundbank", 22),
    AssetType::new("soundbanktransient", 23),
    AssetType::new("col_map", 24),
    AssetType::new("com_map", 25),
    AssetType::new("glass_map", 26),
    AssetType::new("aipaths", 27),
    AssetType::new("navmesh", 28),
    AssetType::new("tacgraph", 29),
    AssetType::new("map_ents", 29),
    AssetType::new("fx_map", 30),
    AssetType::new("gfx_map", 32),
    AssetType::new("gfx_map_trzone", 32),
    AssetType::new("iesprofile", 33),
    AssetType::new("lightdef", 34),
    AssetType::new("gradingclut", 35),
    AssetType::new("ui_map", 36),
    AssetType::new("fogspline", 37),
    AssetType::new("animclass", 38),
    AssetType::new("playeranim", 39),
    AssetType::new("localize", 40),
    AssetType::new("attachment", 41),
    AssetType::new("weapon", 43),
    AssetType::new("impactfx", 44),
    AssetType::new("surfacefx", 45),
    AssetType::new("aitype", 46),
    AssetType::new("mptype", 47),
    AssetType::new("character", 48),
    AssetType::new("xmodelalias", 49),
    AssetType::new("rawfile", 51),
    AssetType::new("scriptfile", 52),
    AssetType::new("scriptdebugdata", 53),
    AssetType::new("stringtable", 54),
    AssetType::new("leaderboarddef", 55),
    AssetType::new("virtualleaderboarddef", 56),
    AssetType::new("ddl", 57),
    AssetType::new("tracer", 58),
    AssetType::new("vehicle", 59),
    AssetType::new("addon_map_ents", 60),
    AssetType::new("netconststrings", 61),
    AssetType::new("luafile", 62),
    AssetType::new("scriptable", 63),
    AssetType::new("equipsndtable", 64),
    AssetType::new("vectorfield", 65),
    AssetType::new("particlesimanimation", 66),
    AssetType::new("streaminginfo", 67),
    AssetType::new("laser", 68),
    AssetType::new("ttf", 69),
    AssetType::new("suit", 70),
    AssetType::new("suitanimpackage", 71),
    AssetType::new("camera", 72),
    AssetType::new("hudoutline", 73),
    AssetType::new("spaceshiptarget", 74),
    AssetType::new("rumble", 75),
    AssetType::new("rumblegraph", 76),
    AssetType::new("animpkg", 77),
    AssetType::new("sfxpkg", 78),
    AssetType::new("vfxpkg", 79),
    AssetType::new("footstepvfx", 80),
    AssetType::new("behaviortree", 81),
    AssetType::new("aianimset", 82),
    AssetType::new("aiasm", 83),
    AssetType::new("proceduralbones", 84),
    AssetType::new("dynamicbones", 85),
    AssetType::new("reticle", 86),
    AssetType::new("xanimcurve", 87),
    AssetType::new("coverselector", 88),
    AssetType::new("enemyselector", 89),
    AssetType::new("clientcharacter", 90),
    AssetType::new("clothasset", 91),
    AssetType::new("cinematicmotion", 92),
    AssetType::new("locdmgtable", 93),
    AssetType::new("bulletpenetration", 94),
    AssetType::new("scriptbundle", 95),
    AssetType::new("blendspace2d", 96),
    AssetType::new("xcam", 97),
    AssetType::new("camo", 98),
    AssetType::new("xcompositemodel", 99),
    AssetType::new("xmodeldetailcollision", 100),
    AssetType::new("streamkey", 101),
    AssetType::new("streamtreeoverride", 102),
    AssetType::new("keyvaluepairs", 103),
    AssetType::new("stterrain", 104),
    AssetType::new("nativescriptpatch", 105),
    AssetType::new("carryobject", 106),
    AssetType::new("soundbanklist", 107),
    AssetType::new("decalvolumematerial", 108),
    AssetType::new("decalvolumemask", 109),
    AssetType::new("fx_map_trzone", 110),
    AssetType::new("dlogschema", 111),
    AssetType::new("edgelist", 112),
    AssetType::new("defaultdummy", 113),
    AssetType::new("dummy", 114),
];
