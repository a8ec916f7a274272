//! Parser integration tests over synthetic fonts

use typeatlas_core::FontError;
use typeatlas_testfonts::{minimal_font, alphabet_font, FontSpec, GlyphSpec};
use typeatlas_ttf::{glyph_quads, parse_ttf, ParseSettings};

fn settings() -> ParseSettings {
    ParseSettings::default()
}

#[test]
fn parses_minimal_font() {
    let built = minimal_font();
    let font = parse_ttf(&built.data, &settings()).unwrap();

    assert_eq!(font.head.units_per_em, 1000);
    assert_eq!(font.maxp.num_glyphs, 2); // .notdef + 'A'
    assert_eq!(font.hhea.ascender, 800);
    assert_eq!(font.hhea.descender, -200);
    assert!(font.gpos.is_none());
    assert!(font.diagnostics.is_empty());
}

#[test]
fn metric_counts_round_trip() {
    let built = alphabet_font();
    let font = parse_ttf(&built.data, &settings()).unwrap();

    assert_eq!(
        font.hmtx.h_metrics.len() + font.hmtx.left_side_bearings.len(),
        font.maxp.num_glyphs as usize
    );
    assert_eq!(font.loca.offsets.len(), font.maxp.num_glyphs as usize + 1);
    assert_eq!(font.glyf.len(), font.maxp.num_glyphs as usize);
}

#[test]
fn trailing_bearings_split_out() {
    let built = FontSpec {
        glyphs: vec![
            GlyphSpec { ch: 'A', advance: 600, lsb: 50, bbox: (50, 0, 550, 700) },
            GlyphSpec { ch: 'B', advance: 620, lsb: 40, bbox: (40, 0, 560, 700) },
            GlyphSpec { ch: 'C', advance: 580, lsb: 30, bbox: (30, -10, 540, 690) },
        ],
        number_of_h_metrics: Some(2),
        ..FontSpec::default()
    }
    .build();
    let font = parse_ttf(&built.data, &settings()).unwrap();

    assert_eq!(font.hmtx.h_metrics.len(), 2);
    assert_eq!(font.hmtx.left_side_bearings.len(), 2);
    assert_eq!(
        font.hmtx.h_metrics.len() + font.hmtx.left_side_bearings.len(),
        font.maxp.num_glyphs as usize
    );

    // 'B' and 'C' are past numberOfHMetrics: advance comes from the last
    // explicit metric, bearings from the trailing array.
    let quads = glyph_quads(&font, Some("BC")).unwrap();
    assert_eq!(quads[0].lsb, 40);
    assert_eq!(quads[1].lsb, 30);
    // advance of the last explicit metric ('A', 600): rsb = 600 - lsb - width
    assert_eq!(quads[1].rsb, 600 - 30 - (540 - 30));
}

#[test]
fn empty_buffer_is_unsupported() {
    let err = parse_ttf(&[], &settings()).unwrap_err();
    assert!(matches!(err, FontError::UnsupportedFormat(_)));
}

#[test]
fn implausible_table_count_is_unsupported() {
    // Not a font: PNG magic followed by zeros reads as a huge table count.
    let mut data = vec![0x89, b'P', b'N', b'G'];
    data.extend_from_slice(&[0xFF; 16]);
    let err = parse_ttf(&data, &settings()).unwrap_err();
    assert!(matches!(err, FontError::UnsupportedFormat(_)));
}

#[test]
fn corrupting_any_non_head_table_fails_checksum() {
    for tag in [b"cmap", b"hmtx", b"glyf", b"loca"] {
        let built = minimal_font();
        let (start, _end) = built.table_range(tag).unwrap();
        let mut data = built.data.clone();
        data[start] ^= 0xFF;

        let err = parse_ttf(&data, &settings()).unwrap_err();
        assert!(
            matches!(err, FontError::CorruptFont(_)),
            "corrupting {tag:?} gave {err:?}"
        );
    }
}

#[test]
fn corrupting_head_magic_is_corrupt_font() {
    let built = minimal_font();
    let (start, _) = built.table_range(b"head").unwrap();
    let mut data = built.data.clone();
    // magicNumber sits 12 bytes into head
    data[start + 12] ^= 0xFF;

    let err = parse_ttf(&data, &settings()).unwrap_err();
    assert!(matches!(err, FontError::CorruptFont(_)));
}

#[test]
fn truncated_file_is_truncated_data() {
    let built = minimal_font();
    let err = parse_ttf(&built.data[..40], &settings()).unwrap_err();
    assert!(matches!(err, FontError::TruncatedData { .. }));
}

#[test]
fn cmap_maps_alphabet() {
    let built = alphabet_font();
    let font = parse_ttf(&built.data, &settings()).unwrap();

    assert_eq!(font.cmap.glyph_index_map.len(), 26);
    assert_eq!(font.glyph_index('A'), Some(1));
    assert_eq!(font.glyph_index('Z'), Some(26));
    assert_eq!(font.glyph_index('a'), None);
}

#[test]
fn glyph_quads_expose_bearings_and_bbox() {
    let built = minimal_font();
    let font = parse_ttf(&built.data, &settings()).unwrap();
    let quads = glyph_quads(&font, Some("A")).unwrap();

    assert_eq!(quads.len(), 1);
    let a = quads[0];
    assert_eq!(a.id, 'A' as u32);
    assert_eq!(a.x, 50);
    assert_eq!(a.y, 0);
    assert_eq!(a.width, 500);
    assert_eq!(a.height, 700);
    assert_eq!(a.lsb, 50);
    assert_eq!(a.rsb, 600 - 50 - 500);
}

#[test]
fn glyph_quads_default_to_whole_cmap() {
    let built = alphabet_font();
    let font = parse_ttf(&built.data, &settings()).unwrap();
    let quads = glyph_quads(&font, None).unwrap();
    assert_eq!(quads.len(), 26);
}

#[test]
fn missing_character_is_glyph_not_found() {
    let built = minimal_font();
    let font = parse_ttf(&built.data, &settings()).unwrap();
    let err = glyph_quads(&font, Some("B")).unwrap_err();
    assert!(matches!(
        err,
        FontError::GlyphNotFound { codepoint } if codepoint == 'B' as u32
    ));
}

#[test]
fn gpos_pair_kerning_parses() {
    let built = FontSpec {
        glyphs: vec![
            GlyphSpec { ch: 'A', advance: 600, lsb: 50, bbox: (50, 0, 550, 700) },
            GlyphSpec { ch: 'V', advance: 600, lsb: 50, bbox: (50, 0, 550, 700) },
        ],
        kerning: vec![('A', 'V', -80), ('V', 'A', -60)],
        ..FontSpec::default()
    }
    .build();
    let font = parse_ttf(&built.data, &settings()).unwrap();

    let gpos = font.gpos.as_ref().unwrap();
    let kern = gpos
        .features
        .iter()
        .find(|f| &f.tag == b"kern")
        .expect("kern feature present");
    assert_eq!(kern.lookup_list_indices, vec![0]);

    let lookup = &gpos.lookups[0];
    assert_eq!(lookup.lookup_type, 9);
    assert_eq!(lookup.subtables.len(), 1);

    match &lookup.subtables[0] {
        typeatlas_ttf::gpos::PairAdjustment::Pairs { pair_sets, .. } => {
            assert_eq!(pair_sets.len(), 2);
            let first = &pair_sets[0][0];
            assert_eq!(first.second_glyph, 2); // 'V'
            assert_eq!(first.value1.unwrap().x_advance, Some(-80));
        }
        other => panic!("expected explicit pairs, got {other:?}"),
    }
    assert!(font.diagnostics.is_empty());
}

#[test]
fn empty_outline_glyphs_read_as_zeroed_headers() {
    let built = FontSpec {
        glyphs: vec![
            GlyphSpec { ch: ' ', advance: 250, lsb: 0, bbox: (0, 0, 0, 0) },
            GlyphSpec { ch: 'A', advance: 600, lsb: 50, bbox: (50, 0, 550, 700) },
        ],
        ..FontSpec::default()
    }
    .build();
    let font = parse_ttf(&built.data, &settings()).unwrap();

    // glyph 1 is the space: loca[1] == loca[2], so the header is all zeros.
    assert_eq!(font.loca.offsets[1], font.loca.offsets[2]);
    assert_eq!(font.glyf[1].number_of_contours, 0);
    assert_eq!(font.glyf[1].x_max, 0);

    let quads = glyph_quads(&font, Some(" A")).unwrap();
    assert_eq!(quads[0].width, 0);
    assert_eq!(quads[0].height, 0);
    assert_eq!(quads[0].rsb, 250); // the whole advance is empty space
    assert_eq!(quads[1].width, 500);
}

#[test]
fn cmap_id_range_offset_indirection() {
    // Segment [65, 66] resolving through the glyph index array with
    // idDelta = 5 applied after the indirection.
    let mut cmap = Vec::new();
    let u16be = |v: u16| v.to_be_bytes();
    cmap.extend_from_slice(&u16be(0)); // version
    cmap.extend_from_slice(&u16be(1)); // numTables
    cmap.extend_from_slice(&u16be(3)); // platformID
    cmap.extend_from_slice(&u16be(1)); // encodingID
    cmap.extend_from_slice(&12u32.to_be_bytes()); // subtable offset
    cmap.extend_from_slice(&u16be(4)); // format
    cmap.extend_from_slice(&u16be(16 + 8 * 2 + 4)); // length
    cmap.extend_from_slice(&u16be(0)); // language
    cmap.extend_from_slice(&u16be(4)); // segCountX2
    cmap.extend_from_slice(&u16be(4)); // searchRange
    cmap.extend_from_slice(&u16be(1)); // entrySelector
    cmap.extend_from_slice(&u16be(0)); // rangeShift
    cmap.extend_from_slice(&u16be(66)); // endCode[0]
    cmap.extend_from_slice(&u16be(0xFFFF)); // endCode[1]
    cmap.extend_from_slice(&u16be(0)); // reservedPad
    cmap.extend_from_slice(&u16be(65)); // startCode[0]
    cmap.extend_from_slice(&u16be(0xFFFF)); // startCode[1]
    cmap.extend_from_slice(&u16be(5)); // idDelta[0]
    cmap.extend_from_slice(&u16be(1)); // idDelta[1]
    // idRangeOffset[0] = 4: skips past the rest of the offset array into
    // the glyph index array that follows it.
    cmap.extend_from_slice(&u16be(4));
    cmap.extend_from_slice(&u16be(0)); // idRangeOffset[1]
    cmap.extend_from_slice(&u16be(100)); // glyphIndexArray[0]
    cmap.extend_from_slice(&u16be(101)); // glyphIndexArray[1]

    let mut reader = typeatlas_ttf::FontReader::new(&cmap);
    let table = typeatlas_ttf::tables::read_cmap(&mut reader, 0).unwrap();

    assert_eq!(table.glyph_index_map.get(&65), Some(&105));
    assert_eq!(table.glyph_index_map.get(&66), Some(&106));
}

#[test]
fn identity_cmap_segment() {
    // One segment [65, 90] with idDelta = 0: code point maps to itself.
    let mut cmap = Vec::new();
    let u16be = |v: u16| v.to_be_bytes();
    cmap.extend_from_slice(&u16be(0)); // version
    cmap.extend_from_slice(&u16be(1)); // numTables
    cmap.extend_from_slice(&u16be(3)); // platformID
    cmap.extend_from_slice(&u16be(1)); // encodingID
    cmap.extend_from_slice(&12u32.to_be_bytes()); // subtable offset
    cmap.extend_from_slice(&u16be(4)); // format
    cmap.extend_from_slice(&u16be(16 + 8 * 2)); // length
    cmap.extend_from_slice(&u16be(0)); // language
    cmap.extend_from_slice(&u16be(4)); // segCountX2
    cmap.extend_from_slice(&u16be(4)); // searchRange
    cmap.extend_from_slice(&u16be(1)); // entrySelector
    cmap.extend_from_slice(&u16be(0)); // rangeShift
    cmap.extend_from_slice(&u16be(90)); // endCode[0]
    cmap.extend_from_slice(&u16be(0xFFFF)); // endCode[1]
    cmap.extend_from_slice(&u16be(0)); // reservedPad
    cmap.extend_from_slice(&u16be(65)); // startCode[0]
    cmap.extend_from_slice(&u16be(0xFFFF)); // startCode[1]
    cmap.extend_from_slice(&u16be(0)); // idDelta[0]
    cmap.extend_from_slice(&u16be(1)); // idDelta[1]
    cmap.extend_from_slice(&u16be(0)); // idRangeOffset[0]
    cmap.extend_from_slice(&u16be(0)); // idRangeOffset[1]

    let mut reader = typeatlas_ttf::FontReader::new(&cmap);
    let table = typeatlas_ttf::tables::read_cmap(&mut reader, 0).unwrap();

    assert_eq!(table.seg_count, 2);
    assert_eq!(table.glyph_index_map.get(&65), Some(&65));
    assert_eq!(table.glyph_index_map.get(&90), Some(&90));
    assert_eq!(table.glyph_index_map.len(), 26);
}
