//! Decides whether a QR symbol still decodes once a centred rectangle of
//! modules is hidden.
//!
//! Hidden modules are mapped onto the codewords they belong to, following the
//! symbol's zig-zag placement order. Codewords are then assigned to their
//! Reed-Solomon block through the interleaving order. The symbol survives only
//! if no block loses more codewords than it can correct. Every hidden module
//! counts as an error, whatever colour the overlay has.

use qrcode::{EcLevel, QrCode, Version};
use std::ops::Range;

/// (每區塊糾錯碼字, 第一組區塊數, 第一組資料碼字, 第二組區塊數, 第二組資料碼字)
type BlockLayout = (usize, usize, usize, usize, usize);

/// 版本 1–6 在 M/Q/H 下的區塊結構（ISO/IEC 18004 Table 9）
///
/// 版本 7 起中央有對齊圖樣，疊加圖一定會蓋到，不需要列出
const BLOCK_LAYOUT: [[BlockLayout; 3]; 6] = [
    [(10, 1, 16, 0, 0), (13, 1, 13, 0, 0), (17, 1, 9, 0, 0)],
    [(16, 1, 28, 0, 0), (22, 1, 22, 0, 0), (28, 1, 16, 0, 0)],
    [(26, 1, 44, 0, 0), (18, 2, 17, 0, 0), (22, 2, 13, 0, 0)],
    [(18, 2, 32, 0, 0), (26, 2, 24, 0, 0), (16, 4, 9, 0, 0)],
    [(24, 2, 43, 0, 0), (18, 2, 15, 2, 16), (22, 2, 11, 2, 12)],
    [(16, 4, 27, 0, 0), (24, 4, 19, 0, 0), (28, 4, 15, 0, 0)],
];

const CODEWORD_BITS: usize = 8;
const TIMING_COLUMN: usize = 6;

fn block_layout(code: &QrCode) -> Option<BlockLayout> {
    let Version::Normal(version @ 1..=6) = code.version() else {
        return None;
    };
    let level = match code.error_correction_level() {
        EcLevel::M => 0,
        EcLevel::Q => 1,
        EcLevel::H => 2,
        EcLevel::L => return None,
    };
    Some(BLOCK_LAYOUT[(version - 1) as usize][level])
}

/// 交錯後每個碼字所屬的區塊，以及區塊總數
fn codeword_owners(layout: BlockLayout) -> (Vec<usize>, usize) {
    let (ec_per_block, short_blocks, short_len, long_blocks, long_len) = layout;
    let lengths: Vec<usize> = std::iter::repeat(short_len)
        .take(short_blocks)
        .chain(std::iter::repeat(long_len).take(long_blocks))
        .collect();

    let mut owners = Vec::new();
    for i in 0..short_len.max(long_len) {
        owners.extend(
            lengths
                .iter()
                .enumerate()
                .filter(|(_, len)| i < **len)
                .map(|(block, _)| block),
        );
    }
    for _ in 0..ec_per_block {
        owners.extend(0..lengths.len());
    }

    (owners, lengths.len())
}

/// 資料模組的擺放順序：從右下角開始兩欄一組上下蛇行，跳過 timing pattern 那一欄
fn data_modules(code: &QrCode) -> Vec<(usize, usize)> {
    let width = code.width();
    let mut order = Vec::with_capacity(width * width);
    let mut right = width - 1;
    let mut upward = true;

    loop {
        if right == TIMING_COLUMN {
            right -= 1;
        }
        for i in 0..width {
            let y = if upward { width - 1 - i } else { i };
            for x in [right, right - 1] {
                if !code.is_functional(x, y) {
                    order.push((x, y));
                }
            }
        }
        upward = !upward;
        if right < 3 {
            break;
        }
        right -= 2;
    }

    order
}

/// 每個區塊被遮住的碼字數；蓋到功能圖樣或版本不支援時回傳 None
fn damaged_per_block(
    code: &QrCode,
    columns: &Range<usize>,
    rows: &Range<usize>,
) -> Option<(Vec<usize>, BlockLayout)> {
    let layout = block_layout(code)?;

    for y in rows.clone() {
        for x in columns.clone() {
            if code.is_functional(x, y) {
                return None;
            }
        }
    }

    let (owners, blocks) = codeword_owners(layout);
    let mut damaged = vec![0; blocks];
    let mut last_counted = None;

    for (index, (x, y)) in data_modules(code).into_iter().enumerate() {
        let codeword = index / CODEWORD_BITS;
        // 剩餘位元不屬於任何碼字
        let Some(&block) = owners.get(codeword) else {
            break;
        };
        if columns.contains(&x) && rows.contains(&y) && last_counted != Some(codeword) {
            damaged[block] += 1;
            last_counted = Some(codeword);
        }
    }

    Some((damaged, layout))
}

/// 遮住 `columns` × `rows` 的模組後，每個區塊是否仍能修正
pub fn survives(code: &QrCode, columns: Range<usize>, rows: Range<usize>) -> bool {
    let Some((damaged, layout)) = damaged_per_block(code, &columns, &rows) else {
        return false;
    };

    // 單一區塊時沿用 qrcode 的上限，它已扣除小版本保留的誤判保護
    let correctable = if damaged.len() == 1 {
        code.max_allowed_errors()
    } else {
        layout.0 / 2
    };

    damaged.iter().all(|&count| count <= correctable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_modules_fill_every_codeword() {
        // 版本 1–6 的總碼字數：26, 44, 70, 100, 134, 172
        for (version, total) in [(1, 26), (2, 44), (3, 70), (4, 100), (5, 134), (6, 172)] {
            let code =
                QrCode::with_version(b"a", Version::Normal(version), EcLevel::M).unwrap();
            let modules = data_modules(&code).len();
            assert_eq!(modules / CODEWORD_BITS, total, "version {}", version);

            let (owners, _) = codeword_owners(block_layout(&code).unwrap());
            assert_eq!(owners.len(), total, "version {}", version);
        }
    }

    #[test]
    fn test_placement_starts_bottom_right_and_moves_up() {
        let code = QrCode::with_version(b"a", Version::Normal(1), EcLevel::M).unwrap();
        let order = data_modules(&code);
        assert_eq!(&order[..4], &[(20, 20), (19, 20), (20, 19), (19, 19)]);
    }

    #[test]
    fn test_interleaving_alternates_blocks() {
        // 5-Q：兩個 15 碼字區塊加兩個 16 碼字區塊
        let (owners, blocks) = codeword_owners(BLOCK_LAYOUT[4][1]);
        assert_eq!(blocks, 4);
        assert_eq!(&owners[..8], &[0, 1, 2, 3, 0, 1, 2, 3]);
        // 第 16 個資料碼字只有長區塊有
        assert_eq!(&owners[60..62], &[2, 3]);
        assert_eq!(owners.len(), 62 + 18 * 4);
    }

    #[test]
    fn test_small_hole_survives() {
        let code = QrCode::with_version(b"a", Version::Normal(3), EcLevel::M).unwrap();
        assert!(survives(&code, 12..15, 12..15));
    }

    #[test]
    fn test_large_hole_exceeds_level_m() {
        let code = QrCode::with_version(b"a", Version::Normal(3), EcLevel::M).unwrap();
        let (damaged, _) = damaged_per_block(&code, &(10..19), &(10..19)).unwrap();
        assert!(damaged[0] > code.max_allowed_errors());
        assert!(!survives(&code, 10..19, 10..19));
    }

    #[test]
    fn test_covering_function_patterns_never_survives() {
        let code = QrCode::with_version(b"a", Version::Normal(2), EcLevel::H).unwrap();
        // 第 6 列是 timing pattern
        assert!(!survives(&code, 5..8, 10..12));
    }

    #[test]
    fn test_versions_with_center_alignment_are_rejected() {
        let code = QrCode::with_version(b"a", Version::Normal(7), EcLevel::H).unwrap();
        assert!(!survives(&code, 20..24, 20..24));
    }
}
