//! Scenario tests for loop lowering through the full pipeline.

mod common;

use common::*;
use strata::{PipelineConfig, lower_module};
use strata_ir::arena::dialect::{hl, ll};
use strata_ir::arena::ops::ArenaDialectOp;

#[test]
fn test_while_if_break_exits_scope() {
    // while (x) { if (y) break; }
    let (mut ctx, loc) = test_ctx();
    let brk = hl::r#break(&mut ctx, loc);
    let (then_r, _) = region(&mut ctx, loc, &[brk.op_ref()]);
    let if_c = cond(&mut ctx, loc, 32);
    let if_op = hl::r#if(&mut ctx, loc, if_c, then_r, None);
    let (body, body_b) = region(&mut ctx, loc, &[if_op.op_ref()]);
    let while_c = cond(&mut ctx, loc, 32);
    let while_op = hl::r#while(&mut ctx, loc, while_c, body);
    let (module, func_body) = module_with_func(&mut ctx, loc, &[while_op.op_ref()]);

    let report = lower_module(&mut ctx, module, &PipelineConfig::default())
        .expect("lowering should succeed");
    assert_eq!(report.lowering.scope_exits, 1);

    let func_block = ctx.region(func_body).blocks[0];
    assert_eq!(op_names(&ctx, func_block), ["core.scope", "ll.return"]);

    let blocks = scope_blocks(&ctx, func_block, 0);
    assert_eq!(blocks.len(), 5, "entry, cond, body, then, tail");
    let (entry, cond_b, then_b, tail) = (blocks[0], blocks[1], blocks[3], blocks[4]);
    assert_eq!(blocks[2], body_b);

    assert_eq!(successors(&ctx, entry), [cond_b]);
    assert_eq!(successors(&ctx, cond_b), [body_b]);
    assert!(ll::CondScopeRet::matches(&ctx, ctx.last_op(cond_b).unwrap()));
    assert_eq!(successors(&ctx, body_b), [then_b, tail]);
    // The true edge leaves the loop, the false edge takes the back-edge.
    assert_eq!(op_names(&ctx, then_b), ["ll.scope_ret"]);
    assert_eq!(successors(&ctx, tail), [cond_b]);
}

#[test]
fn test_do_while_runs_body_first() {
    let (mut ctx, loc) = test_ctx();
    let (body, body_b) = region(&mut ctx, loc, &[]);
    let c = cond(&mut ctx, loc, 32);
    let do_op = hl::r#do(&mut ctx, loc, body, c);
    let (module, func_body) = module_with_func(&mut ctx, loc, &[do_op.op_ref()]);

    lower_module(&mut ctx, module, &PipelineConfig::default()).expect("lowering should succeed");

    let func_block = ctx.region(func_body).blocks[0];
    let blocks = scope_blocks(&ctx, func_block, 0);
    let (entry, cond_b) = (blocks[0], blocks[1]);
    assert_eq!(successors(&ctx, entry), [body_b]);
    assert_eq!(successors(&ctx, body_b), [cond_b]);
    assert_eq!(successors(&ctx, cond_b), [body_b]);
}

#[test]
fn test_for_continue_targets_increment() {
    // for (; x; i++) { continue; }
    let (mut ctx, loc) = test_ctx();
    let (inc_c, _) = int_const(&mut ctx, loc, 32, 1);
    let (incr, inc_b) = region(&mut ctx, loc, &[inc_c]);
    let cont = hl::r#continue(&mut ctx, loc);
    let (body, body_b) = region(&mut ctx, loc, &[cont.op_ref()]);
    let c = cond(&mut ctx, loc, 32);
    let for_op = hl::r#for(&mut ctx, loc, c, incr, body);
    let (module, func_body) = module_with_func(&mut ctx, loc, &[for_op.op_ref()]);

    let report = lower_module(&mut ctx, module, &PipelineConfig::default())
        .expect("lowering should succeed");
    assert_eq!(report.lowering.scope_exits, 0);

    let func_block = ctx.region(func_body).blocks[0];
    let blocks = scope_blocks(&ctx, func_block, 0);
    assert_eq!(blocks.len(), 4, "entry, incr, cond, body");
    let (entry, cond_b) = (blocks[0], blocks[2]);
    assert_eq!(blocks[1], inc_b);
    assert_eq!(blocks[3], body_b);

    // body -> incr -> cond -> { body | exit }
    assert_eq!(op_names(&ctx, body_b), ["ll.br"]);
    assert_eq!(successors(&ctx, body_b), [inc_b]);
    assert_eq!(op_names(&ctx, inc_b), ["hl.const", "ll.br"]);
    assert_eq!(successors(&ctx, inc_b), [cond_b]);
    assert_eq!(successors(&ctx, cond_b), [body_b]);
    assert_eq!(successors(&ctx, entry), [cond_b]);
}

#[test]
fn test_nested_loops_resolve_their_own_jumps() {
    // while (x) { while (y) { break; } continue; }
    let (mut ctx, loc) = test_ctx();
    let brk = hl::r#break(&mut ctx, loc);
    let (inner_body, inner_body_b) = region(&mut ctx, loc, &[brk.op_ref()]);
    let inner_c = cond(&mut ctx, loc, 32);
    let inner = hl::r#while(&mut ctx, loc, inner_c, inner_body);
    let cont = hl::r#continue(&mut ctx, loc);
    let (outer_body, outer_body_b) = region(&mut ctx, loc, &[inner.op_ref(), cont.op_ref()]);
    let outer_c = cond(&mut ctx, loc, 32);
    let outer = hl::r#while(&mut ctx, loc, outer_c, outer_body);
    let (module, func_body) = module_with_func(&mut ctx, loc, &[outer.op_ref()]);

    lower_module(&mut ctx, module, &PipelineConfig::default()).expect("lowering should succeed");

    let func_block = ctx.region(func_body).blocks[0];
    let outer_blocks = scope_blocks(&ctx, func_block, 0);
    let outer_cond = outer_blocks[1];
    assert_eq!(outer_blocks[2], outer_body_b);
    assert_eq!(op_names(&ctx, outer_body_b), ["core.scope", "ll.br"]);
    assert_eq!(successors(&ctx, outer_body_b), [outer_cond]);

    let inner_blocks = scope_blocks(&ctx, outer_body_b, 0);
    assert_eq!(inner_blocks[2], inner_body_b);
    assert_eq!(op_names(&ctx, inner_body_b), ["ll.scope_ret"]);
}

#[test]
fn test_return_inside_loop_leaves_function() {
    // while (x) { return 0; }
    let (mut ctx, loc) = test_ctx();
    let body = return_const(&mut ctx, loc, 0);
    let c = cond(&mut ctx, loc, 32);
    let while_op = hl::r#while(&mut ctx, loc, c, body);
    let (module, func_body) = module_with_func(&mut ctx, loc, &[while_op.op_ref()]);

    let report = lower_module(&mut ctx, module, &PipelineConfig::default())
        .expect("lowering should succeed");
    assert_eq!(report.lowering.scope_exits, 0);

    let func_block = ctx.region(func_body).blocks[0];
    let blocks = scope_blocks(&ctx, func_block, 0);
    let body_b = blocks[2];
    assert_eq!(op_names(&ctx, body_b), ["hl.const", "ll.return"]);
    let ret = ll::Return::from_op(&ctx, ctx.last_op(body_b).unwrap()).unwrap();
    assert_eq!(ret.values(&ctx).len(), 1);
}
