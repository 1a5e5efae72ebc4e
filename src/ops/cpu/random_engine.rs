//! CPU implementation of the random engine kernels.

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::{FillParams, RandomEngineKernels};
use crate::random::{MT_MAX_STREAMS, MT_STATE_LENGTH, MT_TABLE_LENGTH, MersenneBuffers};
use crate::runtime::cpu::helpers::{
    check_u32_buffer, dispatch_normal_dtype, dispatch_random_dtype, u32_slice,
};
use crate::runtime::cpu::kernels::{
    MersenneTables, counter_normal_kernel, counter_uniform_kernel, mersenne_init_kernel,
    mersenne_normal_kernel, mersenne_uniform_kernel,
};
use crate::runtime::cpu::{CpuClient, CpuRuntime};
use crate::tensor::RawBuffer;

fn check_output(op: &'static str, out: &RawBuffer) -> Result<()> {
    if out.ptr == 0 {
        return Err(Error::InvalidArgument {
            arg: "out",
            reason: format!("{op} got a null buffer for {} values", out.len),
        });
    }
    Ok(())
}

/// Borrow the parameter tables as host slices
///
/// # Safety
/// The buffers must stay alive and unwritten while the tables are in use.
unsafe fn host_tables<'a>(op: &'static str, tables: &MersenneBuffers) -> Result<MersenneTables<'a>> {
    unsafe {
        Ok(MersenneTables {
            pos: u32_slice(op, 0, &tables.pos, MT_MAX_STREAMS)?,
            sh1: u32_slice(op, 1, &tables.sh1, MT_MAX_STREAMS)?,
            sh2: u32_slice(op, 2, &tables.sh2, MT_MAX_STREAMS)?,
            mask: tables.mask,
            recursion: u32_slice(op, 4, &tables.recursion_table, MT_TABLE_LENGTH)?,
            temper: u32_slice(op, 5, &tables.temper_table, MT_TABLE_LENGTH)?,
        })
    }
}

impl RandomEngineKernels<CpuRuntime> for CpuClient {
    fn fill_uniform(&self, out: RawBuffer, params: &FillParams) -> Result<()> {
        const OP: &str = "fill_uniform";
        if out.len == 0 {
            return Ok(());
        }
        check_output(OP, &out)?;
        tracing::trace!(dtype = %out.dtype, len = out.len, ?params, "cpu uniform fill");

        match *params {
            FillParams::Counter(req) => {
                dispatch_random_dtype!(out.dtype, T => {
                    unsafe {
                        counter_uniform_kernel::<T>(
                            out.ptr as *mut T,
                            out.len,
                            req.engine,
                            req.seed,
                            req.counter,
                        )
                    }
                }, OP);
            }
            FillParams::Mersenne { tables, state } => {
                check_u32_buffer(OP, 1, &state, MT_STATE_LENGTH)?;
                let tables = unsafe { host_tables(OP, &tables)? };
                dispatch_random_dtype!(out.dtype, T => {
                    unsafe {
                        mersenne_uniform_kernel::<T>(
                            out.ptr as *mut T,
                            out.len,
                            &tables,
                            state.ptr as *mut u32,
                        )
                    }
                }, OP);
            }
        }

        Ok(())
    }

    fn fill_normal(&self, out: RawBuffer, params: &FillParams) -> Result<()> {
        const OP: &str = "fill_normal";
        if out.len == 0 {
            return Ok(());
        }
        check_output(OP, &out)?;
        tracing::trace!(dtype = %out.dtype, len = out.len, ?params, "cpu normal fill");

        match *params {
            FillParams::Counter(req) => {
                dispatch_normal_dtype!(out.dtype, T => {
                    unsafe {
                        counter_normal_kernel::<T>(
                            out.ptr as *mut T,
                            out.len,
                            req.engine,
                            req.seed,
                            req.counter,
                        )
                    }
                }, OP);
            }
            FillParams::Mersenne { tables, state } => {
                check_u32_buffer(OP, 1, &state, MT_STATE_LENGTH)?;
                let tables = unsafe { host_tables(OP, &tables)? };
                dispatch_normal_dtype!(out.dtype, T => {
                    unsafe {
                        mersenne_normal_kernel::<T>(
                            out.ptr as *mut T,
                            out.len,
                            &tables,
                            state.ptr as *mut u32,
                        )
                    }
                }, OP);
            }
        }

        Ok(())
    }

    fn init_mersenne_state(
        &self,
        state: RawBuffer,
        recursion_table: RawBuffer,
        seed: u64,
    ) -> Result<()> {
        const OP: &str = "init_mersenne_state";
        check_u32_buffer(OP, 0, &state, MT_STATE_LENGTH)?;
        check_u32_buffer(OP, 1, &recursion_table, MT_TABLE_LENGTH)?;
        tracing::trace!(seed, "cpu mersenne init");

        unsafe {
            mersenne_init_kernel(
                state.ptr as *mut u32,
                recursion_table.ptr as *const u32,
                seed,
            )
        };
        Ok(())
    }
}
