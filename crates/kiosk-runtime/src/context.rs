use std::time::{Duration, Instant};

use anyhow::Result;
use wasmtime::{Config, Engine, Linker, Module, Store};
use wasmtime_wasi::p2::pipe::MemoryOutputPipe;
use wasmtime_wasi::preview1::WasiP1Ctx;
use wasmtime_wasi::{I32Exit, WasiCtxBuilder};

use crate::error::RunnerError;
use crate::observe::{RunObserver, RunPhase};

/// Per-run store state: the WASI context carrying argv and the stdout pipe.
pub struct RunCtx {
    wasi: WasiP1Ctx,
}

/// Shared Wasmtime engine and linker.
///
/// Constructed once per session and reused across every compile and run.
/// The engine is thread-safe; the linker is pre-configured with WASI
/// preview 1 host functions, which is the import surface the demo modules
/// are built against.
pub struct RuntimeContext {
    pub engine: Engine,
    linker: Linker<RunCtx>,
}

impl RuntimeContext {
    pub fn new() -> Result<Self> {
        let mut config = Config::new();
        config.async_support(true);

        let engine = Engine::new(&config)?;
        let mut linker: Linker<RunCtx> = Linker::new(&engine);
        wasmtime_wasi::preview1::add_to_linker_async(&mut linker, |ctx: &mut RunCtx| {
            &mut ctx.wasi
        })?;

        tracing::debug!("runtime context initialized (async + WASI p1)");
        Ok(Self { engine, linker })
    }

    /// Instantiate a fresh execution context for `module` and run it to
    /// completion, returning the wall-clock duration of the run itself.
    ///
    /// `argv` must already carry the leading program-name token. The
    /// guest's stdout is bound to `stdout` for exactly this run. The clock
    /// starts after instantiation, so the reported time covers only the
    /// program's execution. A clean `proc_exit(0)` counts as normal
    /// completion.
    pub async fn execute(
        &self,
        module: &Module,
        argv: &[String],
        stdout: MemoryOutputPipe,
        observer: &dyn RunObserver,
    ) -> Result<Duration, RunnerError> {
        let wasi = WasiCtxBuilder::new().args(argv).stdout(stdout).build_p1();
        let mut store = Store::new(&self.engine, RunCtx { wasi });

        let instance = self
            .linker
            .instantiate_async(&mut store, module)
            .await
            .map_err(|e| RunnerError::Instantiate(e.to_string()))?;

        let start = instance
            .get_typed_func::<(), ()>(&mut store, "_start")
            .map_err(|e| RunnerError::Instantiate(format!("no runnable entry point: {e}")))?;

        observer.on_phase(RunPhase::Running);
        let started = Instant::now();
        match start.call_async(&mut store, ()).await {
            Ok(()) => Ok(started.elapsed()),
            Err(trap) => match trap.downcast_ref::<I32Exit>() {
                Some(I32Exit(0)) => Ok(started.elapsed()),
                Some(I32Exit(code)) => {
                    Err(RunnerError::Runtime(format!("exit status {code}")))
                }
                None => Err(RunnerError::Runtime(trap.to_string())),
            },
        }
    }
}
