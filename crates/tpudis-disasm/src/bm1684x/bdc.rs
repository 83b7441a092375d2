//! Compute-engine (BDC) variants.

use tpudis_core::Engine;

use crate::variant::{Discriminants, VariantBase, VariantDecl};

const fn bdc(opcode: u64, table: &'static [(u64, &'static str)]) -> VariantBase {
    VariantBase::named(Engine::Bdc, opcode, table)
}

static CONV: VariantBase = bdc(0, &[(0, "conv.normal"), (1, "conv.wrq"), (2, "conv.wrqrelu")]);

static PORD: VariantBase = bdc(
    1,
    &[
        (0, "pord.depthwise"),
        (1, "pord.avgpooling"),
        (2, "pord.depthwiserelu"),
        (4, "pord.maxpooling"),
        (5, "pord.roiDepthwise"),
        (6, "pord.roiavgpooling"),
        (7, "pord.roimaxpooling"),
    ],
);

// MM and MM2 share opcode 2 and are told apart by unit type.
static MM: VariantBase = bdc(2, &[(1, "mm.normal"), (2, "mm.wrq"), (3, "mm.wrqrelu")]);

static MM2: VariantBase = bdc(2, &[(4, "mm2.nn"), (5, "mm2.nt"), (6, "mm2.tt")]);

static AR: VariantBase = bdc(
    3,
    &[
        (0, "arith.mul"),
        (1, "arith.not"),
        (2, "arith.add"),
        (3, "arith.sub"),
        (4, "arith.max"),
        (5, "arith.min"),
        (6, "arith.logicShift"),
        (7, "arith.and"),
        (8, "arith.or"),
        (9, "arith.xor"),
        (10, "arith.selectGreat"),
        (11, "arith.selectEqual"),
        (12, "arith.div"),
        (13, "arith.selectLess"),
        (14, "arith.cast"),
        (15, "arith.adds"),
        (16, "arith.subs"),
        (18, "arith.mac"),
        (19, "arith.copy"),
        (20, "arith.muls"),
        (21, "arith.ashift"),
        (22, "arith.cshift"),
        (23, "arith.mulDHR"),
        (24, "arith.euIdxGen"),
        (25, "arith.npuIdxGen"),
        (26, "arith.abs"),
        (27, "arith.fsubabs"),
        (28, "arith.copyMb"),
        (29, "arith.getFirstOne"),
        (30, "arith.getFirstZero"),
    ],
);

static RQDQ: VariantBase = bdc(
    4,
    &[
        (0, "quant.rq0"),
        (1, "quant.rq1"),
        (2, "quant.rq2"),
        (3, "quant.dq0"),
        (4, "quant.dq1"),
        (5, "quant.dq2"),
    ],
);

static TRANS_BC: VariantBase = bdc(
    5,
    &[
        (0, "tsbc.cw_ts"),
        (1, "tsbc.wc_ts"),
        (2, "tsbc.l_copy"),
        (3, "tsbc.l_bc"),
        (4, "tsbc.s_bc"),
        (5, "tsbc.s_distribute"),
    ],
);

// SG and SGL share opcode 6.
static SG: VariantBase = bdc(
    6,
    &[
        (0, "sg.pl_gather_d1coor"),
        (1, "sg.pl_gather_d2coor"),
        (2, "sg.pl_gather_rec"),
        (3, "sg.pl_scatter_d1coor"),
        (4, "sg.pl_scatter_d2coor"),
        (5, "sg.pe_s_gather_d1coor"),
        (6, "sg.pe_s_scatter_d1coor"),
        (7, "sg.pe_m_gather_d1coor"),
        (8, "sg.pe_s_mask_select"),
        (9, "sg.pe_s_nonzero"),
        (10, "sg.pe_s_scatter_pp_d1coor"),
        (11, "sg.pl_gather_perw"),
        (12, "sg.pl_scatter_perw"),
        (13, "sg.pe_s_gather_hzd"),
        (14, "sg.pe_s_scatter_hzd"),
        (15, "sg.pe_s_mask_selhzd"),
        (16, "sg.pe_s_nonzero_hzd"),
    ],
);

static SGL: VariantBase = bdc(6, &[(17, "sgl.pe_s_gather_line"), (18, "sgl.pe_s_scatter_line")]);

static LAR: VariantBase = VariantBase {
    engine: Engine::Bdc,
    opcode: 7,
    discriminants: Discriminants::Range(0..=30),
    op_name: Some("lar"),
    alias: None,
};

static SFU: VariantBase = bdc(
    9,
    &[
        (12, "sfu.tailor_4x"),
        (13, "sfu.tailor"),
        (15, "sfu.normalize"),
        (17, "sfu.rsqrt"),
    ],
);

static LIN: VariantBase = bdc(
    10,
    &[(1, "lin.mac"), (20, "lin.square_sum"), (21, "lin.square_diff")],
);

static CMP: VariantBase = bdc(
    13,
    &[
        (22, "cmp.gt_and_sel"),
        (23, "cmp.sel_gt"),
        (24, "cmp.sel_eq"),
        (25, "cmp.lt_and_sel"),
        (26, "cmp.sel_lt"),
    ],
);

static VC: VariantBase = bdc(
    14,
    &[
        (0, "vc.mul"),
        (2, "vc.add"),
        (3, "vc.sub"),
        (4, "vc.max"),
        (5, "vc.min"),
        (7, "vc.and"),
        (8, "vc.or"),
        (9, "vc.xor"),
        (10, "vc.select_gt"),
        (11, "vc.select_eq"),
        (12, "vc.div"),
        (13, "vc.select_lt"),
        (15, "vc.add_satu"),
        (16, "vc.sub_satu"),
        (20, "vc.mul_satu"),
        (23, "vc.mulDHR"),
    ],
);

static SYSID: VariantBase = VariantBase {
    engine: Engine::Bdc,
    opcode: 15,
    discriminants: Discriminants::Codes(&[0, 1, 2, 3, 4, 5, 30, 31]),
    op_name: None,
    alias: Some("syncID"),
};

/// Compute-engine registrations, in registration order.
pub static BDC_VARIANTS: &[VariantDecl] = &[
    VariantDecl::long("CONV", &CONV, "convolution"),
    VariantDecl::short("sCONV", &CONV, "short convolution"),
    VariantDecl::long("MM", &MM, "matrix multiply"),
    VariantDecl::short("sMM", &MM, "short matrix multiply"),
    VariantDecl::long("MM2", &MM2, "matrix multiply2"),
    VariantDecl::short("sMM2", &MM2, "short matrix multiply2"),
    VariantDecl::long("CMP", &CMP, "fused_cmpare"),
    VariantDecl::short("sCMP", &CMP, "short fused_cmpare"),
    VariantDecl::long("SFU", &SFU, "special_function"),
    VariantDecl::short("sSFU", &SFU, "short special_function"),
    VariantDecl::long("VC", &VC, "vector correlation"),
    VariantDecl::short("sVC", &VC, "short vector correlation"),
    VariantDecl::long("LIN", &LIN, "fused_linear"),
    VariantDecl::short("sLIN", &LIN, "short fused_linear"),
    VariantDecl::long("AR", &AR, "arithmetic"),
    VariantDecl::short("sAR", &AR, "short arithmetic"),
    VariantDecl::long("PorD", &PORD, "depthwise or pooling"),
    VariantDecl::short("sPorD", &PORD, "short depthwise or pooling"),
    VariantDecl::long("RQ&DQ", &RQDQ, "RQ && DQ"),
    VariantDecl::short("sRQ&sDQ", &RQDQ, "short RQ && DQ"),
    VariantDecl::long("SG", &SG, "scatter_gather"),
    VariantDecl::short("sSG", &SG, "short scatter_gather"),
    VariantDecl::long("SGL", &SGL, "scatter_gather_line"),
    VariantDecl::short("sSGL", &SGL, "short scatter_gather_line"),
    VariantDecl::long("TRANS&BC", &TRANS_BC, "TRANS && BC"),
    VariantDecl::short("sTRANS&sBC", &TRANS_BC, "short TRANS && BC"),
    VariantDecl::either("LAR", &LAR, "linear_arithmetic"),
    VariantDecl::either("SYSID", &SYSID, "system"),
];
