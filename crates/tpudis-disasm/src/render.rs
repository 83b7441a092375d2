//! Text rendering of decoded instructions.
//!
//! ```text
//! %R0, %B12 = "conv.normal"(%R1, %C0, %D3) {kernel = [3, 3]} : (memref<..>, none) -> (memref<..>, none)
//! ```
//!
//! The result tag belongs to the decoding engine and the dependency tag to
//! the other engine, so a compute command waits on `%D<n>` and produces
//! `%B<n>`, and a data-movement command the reverse.

use std::fmt::{self, Write};

use tpudis_core::Value;

use crate::Instruction;

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(alias) = self.variant.alias() {
            return f.write_str(alias);
        }
        let sem = &self.semantics;
        if sem.operands.is_empty() {
            return f.write_str(self.variant.description());
        }

        let engine = self.engine();
        if !sem.results.is_empty() {
            write_names(f, &sem.results)?;
            f.write_str(", ")?;
        }
        write!(
            f,
            "%{}{} = \"{}\"(",
            engine.result_tag(),
            self.cmd_id,
            self.op_name()
        )?;
        write_names(f, &sem.operands)?;
        write!(f, ", %{}{})", engine.dep_tag(), self.cmd_id_dep)?;

        if !sem.attributes.is_empty() {
            write!(f, " {}", sem.attributes)?;
        }

        f.write_str(" : (")?;
        write_types(f, &sem.operands)?;
        f.write_str(") -> (")?;
        write_types(f, &sem.results)?;
        f.write_char(')')
    }
}

fn write_names(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(&value.name)?;
    }
    Ok(())
}

/// Types followed by the trailing `none` of the dependency slot.
fn write_types(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    for value in values {
        f.write_str(&value.ty)?;
        f.write_str(", ")?;
    }
    f.write_str("none")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tpudis_core::{Attributes, Engine, RawWord, Semantics};

    use crate::layout::FieldLayout;
    use crate::variant::{Discriminants, VariantBase, VariantDecl, VariantDescriptor};
    use crate::Instruction;

    use super::*;

    static CONV: VariantBase =
        VariantBase::named(Engine::Bdc, 0, &[(0, "conv.normal"), (1, "conv.wrq")]);
    static GENERAL: VariantBase = VariantBase {
        engine: Engine::Gdma,
        opcode: 3,
        discriminants: Discriminants::Named(&[(0, "dma.general"), (1, "dma.general.broadcast")]),
        op_name: None,
        alias: None,
    };
    static SYSID: VariantBase = VariantBase {
        engine: Engine::Bdc,
        opcode: 15,
        discriminants: Discriminants::Codes(&[0, 1, 2, 3, 4, 5, 30, 31]),
        op_name: None,
        alias: Some("syncID"),
    };

    fn instruction(decl: VariantDecl, discriminant: u64, semantics: Semantics) -> Instruction {
        let layout: FieldLayout = [("cmd_id", 20), ("cmd_id_dep", 40), ("rest", 64)]
            .into_iter()
            .collect();
        Instruction {
            variant: Arc::new(VariantDescriptor::new(decl, layout, None)),
            offset: 0,
            raw: RawWord::from_bytes(&[0; 8], 64).unwrap(),
            fields: Default::default(),
            cmd_id: 12,
            cmd_id_dep: 3,
            discriminant: Some(discriminant),
            semantics,
        }
    }

    #[test]
    fn empty_operands_render_description() {
        let insn = instruction(
            VariantDecl::long("CONV", &CONV, "convolution"),
            0,
            Semantics::default().with_result(Value::new("%R0", "memref<1xf32>")),
        );
        assert_eq!(insn.to_string(), "convolution");
    }

    #[test]
    fn alias_wins_over_everything() {
        let insn = instruction(
            VariantDecl::either("SYSID", &SYSID, "system"),
            30,
            Semantics::default().with_operand(Value::new("%R0", "i32")),
        );
        assert_eq!(insn.to_string(), "syncID");
    }

    #[test]
    fn compute_command_text() {
        let sem = Semantics::default()
            .with_result(Value::new("%R0", "memref<1x32xf32>"))
            .with_operand(Value::new("%R1", "memref<1x16xf32>"))
            .with_operand(Value::new("%C0.5", "f32"))
            .with_attributes(Attributes::new().with("kernel", "[3, 3]"));
        let insn = instruction(VariantDecl::long("CONV", &CONV, "convolution"), 1, sem);
        assert_eq!(
            insn.to_string(),
            "%R0, %B12 = \"conv.wrq\"(%R1, %C0.5, %D3) {kernel = [3, 3]} \
             : (memref<1x16xf32>, f32, none) -> (memref<1x32xf32>, none)"
        );
    }

    #[test]
    fn data_movement_swaps_tags() {
        let sem = Semantics::default()
            .with_result(Value::new("%G4096", "memref<64xi8>"))
            .with_operand(Value::new("%L0", "memref<64xi8>"));
        let insn = instruction(VariantDecl::long("DMA_general", &GENERAL, "DMA general"), 1, sem);
        assert_eq!(
            insn.to_string(),
            "%G4096, %D12 = \"dma.general.broadcast\"(%L0, %B3) \
             : (memref<64xi8>, none) -> (memref<64xi8>, none)"
        );
    }

    #[test]
    fn empty_results_omit_leading_list() {
        let sem = Semantics::default().with_operand(Value::new("%R1", "i32"));
        let insn = instruction(VariantDecl::short("sCONV", &CONV, "short convolution"), 0, sem);
        assert_eq!(
            insn.to_string(),
            "%B12 = \"conv.normal\"(%R1, %D3) : (i32, none) -> (none)"
        );
    }
}
