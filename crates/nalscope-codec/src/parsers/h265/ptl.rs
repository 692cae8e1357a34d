//! HEVC profile_tier_level 语法解析.
//!
//! 只保留 general 层的 profile/tier/level. 子层部分只消耗每层 2 个存在标志位
//! 以及补齐到 8 层的保留位, 不读取子层 profile/level 字段.

use nalscope_core::{BitReader, NalResult};

/// general profile/tier/level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileTierLevel {
    /// general_profile_space (0-3)
    pub general_profile_space: u8,
    /// general_tier_flag (false=Main, true=High)
    pub general_tier_flag: bool,
    /// general_profile_idc (1=Main, 2=Main10, 3=MainStillPicture, 4=RExt)
    pub general_profile_idc: u8,
    /// general_level_idc (level * 30, 如 93 = 3.1)
    pub general_level_idc: u8,
}

/// 解析 profile_tier_level(profilePresentFlag, maxNumSubLayersMinus1)
pub fn parse_profile_tier_level(
    br: &mut BitReader,
    profile_present: bool,
    max_sub_layers_minus1: u8,
) -> NalResult<ProfileTierLevel> {
    let mut ptl = ProfileTierLevel::default();

    if profile_present {
        ptl.general_profile_space = br.read_bits(2)? as u8;
        ptl.general_tier_flag = br.read_flag()?;
        ptl.general_profile_idc = br.read_bits(5)? as u8;
        br.skip_bits(32)?; // general_profile_compatibility_flag[32]
        br.skip_bits(48)?; // progressive/interlaced/... + reserved 43 bits + inbld
    }
    ptl.general_level_idc = br.read_bits(8)? as u8;

    // sub_layer_profile_present_flag, sub_layer_level_present_flag
    for _ in 0..max_sub_layers_minus1 {
        br.skip_bits(2)?;
    }
    if max_sub_layers_minus1 > 0 {
        for _ in max_sub_layers_minus1..8 {
            br.skip_bits(2)?; // reserved_zero_2bits
        }
    }

    Ok(ptl)
}
