//! `IrContext`: owner of every op, value, block and region.
//!
//! Entities live in `PrimaryMap`s and refer to each other through handles.
//! Parent links are kept on both sides: a block knows its ops and each op
//! knows its block, and the same holds for regions and blocks and for ops and
//! their regions. Operand lists are pooled `EntityList`s mirrored by a
//! per-value use list, so replacing a value touches only its users.

use std::collections::BTreeMap;

use cranelift_entity::{EntityList, ListPool, PrimaryMap, SecondaryMap};
use smallvec::SmallVec;

use super::refs::*;
use super::types::*;
use crate::symbol::Symbol;

/// Operand slot `operand_index` of `user` reads the value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Use {
    pub user: OpRef,
    pub operand_index: u32,
}

pub struct OperationData {
    pub location: Location,
    pub dialect: Symbol,
    pub name: Symbol,
    pub operands: EntityList<ValueRef>,
    pub results: SmallVec<[ValueRef; 2]>,
    pub attributes: BTreeMap<Symbol, Attribute>,
    /// Owned regions.
    pub regions: SmallVec<[RegionRef; 4]>,
    /// Branch targets; never owned.
    pub successors: SmallVec<[BlockRef; 2]>,
    pub parent_block: Option<BlockRef>,
}

pub struct ValueData {
    pub def: ValueDef,
    pub ty: TypeRef,
}

pub struct BlockData {
    pub location: Location,
    pub args: SmallVec<[ValueRef; 2]>,
    pub ops: SmallVec<[OpRef; 4]>,
    pub parent_region: Option<RegionRef>,
}

pub struct RegionData {
    pub location: Location,
    pub blocks: SmallVec<[BlockRef; 4]>,
    pub parent_op: Option<OpRef>,
}

/// Where a detached op is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertionPoint {
    /// Before the first op of the block.
    Start(BlockRef),
    /// After the last op of the block.
    End(BlockRef),
    /// Immediately before an attached op.
    Before(OpRef),
    /// Immediately after an attached op.
    After(OpRef),
}

#[derive(Default)]
pub struct IrContext {
    ops: PrimaryMap<OpRef, OperationData>,
    values: PrimaryMap<ValueRef, ValueData>,
    blocks: PrimaryMap<BlockRef, BlockData>,
    regions: PrimaryMap<RegionRef, RegionData>,
    uses: SecondaryMap<ValueRef, SmallVec<[Use; 2]>>,
    operand_pool: ListPool<ValueRef>,

    pub types: TypeInterner,
    pub paths: PathInterner,
}

impl IrContext {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- operations ----

    fn create_op(&mut self, builder: OpBuilder) -> OpRef {
        let OpBuilder {
            location,
            dialect,
            name,
            operands,
            result_types,
            attributes,
            regions,
            successors,
        } = builder;

        let operand_list = EntityList::from_slice(&operands, &mut self.operand_pool);
        let op = self.ops.push(OperationData {
            location,
            dialect,
            name,
            operands: operand_list,
            results: SmallVec::new(),
            attributes,
            regions: regions.clone(),
            successors,
            parent_block: None,
        });

        for (index, &value) in operands.iter().enumerate() {
            self.uses[value].push(Use {
                user: op,
                operand_index: index as u32,
            });
        }
        for (index, ty) in result_types.into_iter().enumerate() {
            let value = self.values.push(ValueData {
                def: ValueDef::OpResult(op, index as u32),
                ty,
            });
            self.ops[op].results.push(value);
        }
        for region in regions {
            let owner = self.regions[region].parent_op.replace(op);
            assert!(owner.is_none(), "{region} is already owned by {owner:?}");
        }
        op
    }

    pub fn op(&self, op: OpRef) -> &OperationData {
        &self.ops[op]
    }

    pub fn op_operands(&self, op: OpRef) -> &[ValueRef] {
        self.ops[op].operands.as_slice(&self.operand_pool)
    }

    pub fn op_results(&self, op: OpRef) -> &[ValueRef] {
        &self.ops[op].results
    }

    pub fn op_result(&self, op: OpRef, index: u32) -> ValueRef {
        self.ops[op].results[index as usize]
    }

    /// `dialect.name`, as printed in diagnostics.
    pub fn op_full_name(&self, op: OpRef) -> String {
        let data = &self.ops[op];
        format!("{}.{}", data.dialect, data.name)
    }

    /// Retire a detached op whose results are dead.
    ///
    /// The data stays in the arena so stale handles still resolve; only the
    /// op's own operand uses are released.
    pub fn remove_op(&mut self, op: OpRef) {
        assert!(
            self.ops[op].parent_block.is_none(),
            "{op} must be detached before removal"
        );
        for &value in &self.ops[op].results {
            assert!(
                self.uses[value].is_empty(),
                "{op} cannot be removed: {value} is still used"
            );
        }
        self.drop_operand_uses(op);
    }

    /// Release the operand uses of `op` regardless of where it sits.
    ///
    /// For discarding a whole subgraph whose ops may reference each other.
    pub fn drop_operand_uses(&mut self, op: OpRef) {
        let operands = self.ops[op].operands.as_slice(&self.operand_pool);
        for (index, &value) in operands.iter().enumerate() {
            let index = index as u32;
            self.uses[value].retain(|u| u.user != op || u.operand_index != index);
        }
    }

    // ---- values ----

    pub fn value_ty(&self, value: ValueRef) -> TypeRef {
        self.values[value].ty
    }

    pub fn value_def(&self, value: ValueRef) -> ValueDef {
        self.values[value].def
    }

    pub fn uses(&self, value: ValueRef) -> &[Use] {
        &self.uses[value]
    }

    pub fn has_uses(&self, value: ValueRef) -> bool {
        !self.uses[value].is_empty()
    }

    /// Point every user of `old` at `new`.
    pub fn replace_all_uses(&mut self, old: ValueRef, new: ValueRef) {
        if old == new {
            return;
        }
        for u in std::mem::take(&mut self.uses[old]) {
            let slot = &mut self.ops[u.user].operands.as_mut_slice(&mut self.operand_pool)
                [u.operand_index as usize];
            debug_assert_eq!(*slot, old);
            *slot = new;
            self.uses[new].push(u);
        }
    }

    // ---- blocks ----

    /// A detached block without arguments or ops.
    pub fn create_empty_block(&mut self, location: Location) -> BlockRef {
        self.blocks.push(BlockData {
            location,
            args: SmallVec::new(),
            ops: SmallVec::new(),
            parent_region: None,
        })
    }

    pub fn block(&self, block: BlockRef) -> &BlockData {
        &self.blocks[block]
    }

    pub fn block_mut(&mut self, block: BlockRef) -> &mut BlockData {
        &mut self.blocks[block]
    }

    pub fn block_args(&self, block: BlockRef) -> &[ValueRef] {
        &self.blocks[block].args
    }

    pub fn add_block_arg(&mut self, block: BlockRef, ty: TypeRef) -> ValueRef {
        let index = self.blocks[block].args.len() as u32;
        let value = self.values.push(ValueData {
            def: ValueDef::BlockArg(block, index),
            ty,
        });
        self.blocks[block].args.push(value);
        value
    }

    pub fn last_op(&self, block: BlockRef) -> Option<OpRef> {
        self.blocks[block].ops.last().copied()
    }

    /// Attach a detached op at `point`.
    ///
    /// Returns the block the op landed in, or `None` when `point` is
    /// relative to an op that is itself detached.
    ///
    /// # Panics
    ///
    /// Panics if `op` is already attached.
    pub fn place_op(&mut self, op: OpRef, point: InsertionPoint) -> Option<BlockRef> {
        if let Some(block) = self.ops[op].parent_block {
            panic!("{op} is already attached to {block}");
        }
        let (block, index) = match point {
            InsertionPoint::Start(block) => (block, 0),
            InsertionPoint::End(block) => (block, self.blocks[block].ops.len()),
            InsertionPoint::Before(anchor) => {
                let block = self.ops[anchor].parent_block?;
                (block, self.index_in_block(block, anchor))
            }
            InsertionPoint::After(anchor) => {
                let block = self.ops[anchor].parent_block?;
                (block, self.index_in_block(block, anchor) + 1)
            }
        };
        self.blocks[block].ops.insert(index, op);
        self.ops[op].parent_block = Some(block);
        Some(block)
    }

    /// Append a detached op to `block`.
    pub fn push_op(&mut self, block: BlockRef, op: OpRef) {
        self.place_op(op, InsertionPoint::End(block));
    }

    fn index_in_block(&self, block: BlockRef, op: OpRef) -> usize {
        self.blocks[block]
            .ops
            .iter()
            .position(|&o| o == op)
            .unwrap_or_else(|| panic!("{op} claims {block} as parent but is not in it"))
    }

    /// Unlink `op` from its block, if any. The op itself is kept intact.
    pub fn detach_op(&mut self, op: OpRef) {
        if let Some(block) = self.ops[op].parent_block.take() {
            self.blocks[block].ops.retain(|o| *o != op);
        }
    }

    // ---- regions ----

    /// Register a region and adopt its blocks.
    ///
    /// # Panics
    ///
    /// Panics if one of the blocks is already in a region.
    pub fn create_region(&mut self, data: RegionData) -> RegionRef {
        let blocks = data.blocks.clone();
        let region = self.regions.push(data);
        for block in blocks {
            self.adopt_block(region, block);
        }
        region
    }

    pub fn region(&self, region: RegionRef) -> &RegionData {
        &self.regions[region]
    }

    pub fn region_mut(&mut self, region: RegionRef) -> &mut RegionData {
        &mut self.regions[region]
    }

    /// Append a detached block to `region`.
    pub fn push_block(&mut self, region: RegionRef, block: BlockRef) {
        self.adopt_block(region, block);
        self.regions[region].blocks.push(block);
    }

    fn adopt_block(&mut self, region: RegionRef, block: BlockRef) {
        let previous = self.blocks[block].parent_region.replace(region);
        assert!(
            previous.is_none(),
            "{block} is already in {previous:?}, cannot move it to {region}"
        );
    }

    /// Unlink `block` from its region. Its ops stay in it.
    pub fn detach_block(&mut self, block: BlockRef) {
        if let Some(region) = self.blocks[block].parent_region.take() {
            self.regions[region].blocks.retain(|b| *b != block);
        }
    }
}

/// Collects the parts of a new op; [`OpBuilder::create`] allocates it.
pub struct OpBuilder {
    location: Location,
    dialect: Symbol,
    name: Symbol,
    operands: SmallVec<[ValueRef; 4]>,
    result_types: SmallVec<[TypeRef; 2]>,
    attributes: BTreeMap<Symbol, Attribute>,
    regions: SmallVec<[RegionRef; 4]>,
    successors: SmallVec<[BlockRef; 2]>,
}

impl OpBuilder {
    pub fn new(location: Location, dialect: &'static str, name: &'static str) -> Self {
        Self {
            location,
            dialect: Symbol::new(dialect),
            name: Symbol::new(name),
            operands: SmallVec::new(),
            result_types: SmallVec::new(),
            attributes: BTreeMap::new(),
            regions: SmallVec::new(),
            successors: SmallVec::new(),
        }
    }

    pub fn operand(mut self, value: ValueRef) -> Self {
        self.operands.push(value);
        self
    }

    pub fn operands(mut self, values: impl IntoIterator<Item = ValueRef>) -> Self {
        self.operands.extend(values);
        self
    }

    pub fn result(mut self, ty: TypeRef) -> Self {
        self.result_types.push(ty);
        self
    }

    pub fn attr(mut self, key: impl Into<Symbol>, value: Attribute) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn region(mut self, region: RegionRef) -> Self {
        self.regions.push(region);
        self
    }

    pub fn successor(mut self, block: BlockRef) -> Self {
        self.successors.push(block);
        self
    }

    /// Allocate the op, detached, with one fresh value per result type.
    ///
    /// # Panics
    ///
    /// Panics if one of the regions already has an owner.
    pub fn create(self, ctx: &mut IrContext) -> OpRef {
        ctx.create_op(self)
    }
}
