//! Data-movement-engine (GDMA) variants.

use tpudis_core::Engine;

use crate::variant::{Discriminants, VariantBase, VariantDecl};

/// Base whose op name is fixed and whose special-function code is not checked.
const fn plain(opcode: u64, op_name: &'static str) -> VariantBase {
    VariantBase {
        engine: Engine::Gdma,
        opcode,
        discriminants: Discriminants::Any,
        op_name: Some(op_name),
        alias: None,
    }
}

/// Base dispatched on the special-function code.
const fn special(
    opcode: u64,
    op_name: &'static str,
    table: &'static [(u64, &'static str)],
) -> VariantBase {
    VariantBase::named(Engine::Gdma, opcode, table).op_name(op_name)
}

static TENSOR: VariantBase = special(
    0,
    "dma.tensor",
    &[
        (0, "dma.tensor"),
        (1, "dma.tensor.transpose"),
        (2, "dma.tensor.collect"),
        (3, "dma.tensor.broadcast"),
        (4, "dma.tensor.distribute"),
        (5, "dma.tensor.4bank_copy"),
        (6, "dma.tensor.4bank_broadcast"),
    ],
);

static MATRIX: VariantBase = special(
    1,
    "dma.matrix",
    &[(0, "dma.matrix"), (1, "dma.matrix.transpose")],
);

static MASKED_SELECT: VariantBase = plain(2, "dma.masked_select");

static GENERAL: VariantBase = special(
    3,
    "dma.general",
    &[(0, "dma.general"), (1, "dma.general.broadcast")],
);

static CW_TRANSPOSE: VariantBase = plain(4, "dma.cw_transpose");

static NONZERO: VariantBase = plain(5, "dma.nonzero");

static SYS: VariantBase = special(6, "dma.sys", &[(0, "dma.sys"), (1, "dma.sys.nop")]);

static GATHER: VariantBase = plain(7, "gdma.gather");

static SCATTER: VariantBase = plain(8, "gdma.scatter");

/// Data-movement registrations, in registration order.
pub static GDMA_VARIANTS: &[VariantDecl] = &[
    VariantDecl::long("DMA_tensor（0x000）", &TENSOR, "DMA tensor"),
    VariantDecl::long("DMA_matrix", &MATRIX, "DMA matrix"),
    VariantDecl::short("sDMA_matrix", &MATRIX, "short DMA matrix"),
    VariantDecl::long("DMA_masked_select", &MASKED_SELECT, "DMA masked select"),
    // The sheet name carries a trailing space.
    VariantDecl::short("sDMA_masked_select ", &MASKED_SELECT, "short DMA masked select"),
    VariantDecl::long("DMA_general", &GENERAL, "DMA general"),
    VariantDecl::short("sDMA_general", &GENERAL, "short DMA general"),
    VariantDecl::long("DMA_cw_transpose", &CW_TRANSPOSE, "DMA CW Transpose"),
    VariantDecl::long("DMA_nonzero", &NONZERO, "DMA nonzero"),
    VariantDecl::short("sDMA_nonzero", &NONZERO, "short DMA nonzero"),
    VariantDecl::short("sDMA_sys", &SYS, "short DMA sys"),
    VariantDecl::long("DMA_gather", &GATHER, "DMA gather"),
    VariantDecl::long("DMA_scatter", &SCATTER, "DMA scatter"),
];
