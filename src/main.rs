use clientflow_rust::demo;
use clientflow_rust::{config::CONFIG, AppError};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    env_logger::init();

    log::info!("construyendo el pipeline de demostración (cola={})", CONFIG.queue_name);

    #[cfg(feature = "postgres_demo")]
    {
        let processor = demo::build_processor_pg(CONFIG.include_root).await?;
        run_scenarios(&processor).await?;
    }
    #[cfg(not(feature = "postgres_demo"))]
    {
        let processor = demo::build_processor(CONFIG.include_root)?;
        run_scenarios(&processor).await?;
        println!("auditoría de cambios registrada:");
        for entry in processor.store().audit_change_entries() {
            println!("  {entry:?}");
        }
    }

    Ok(())
}

/// S1 (registro nuevo), S2 (replay idéntico) y S3 (actualización de un
/// subesquema), imprimiendo el registro unificado resultante tras cada paso
/// que lo modifica. Funciona igual sobre el almacén en memoria o Postgres.
async fn run_scenarios<S, B>(processor: &flow_core::RuleProcessor<demo::Cliente, S, B>) -> Result<(), AppError>
where
    S: flow_core::DocumentStore<demo::Cliente>,
    B: flow_core::BrokerClient,
{
    let s1 = serde_json::json!({"id": "CLI001", "info": "hello"});
    processor.handle_message(&s1).await?;
    print_unified(processor, "CLI001").await;

    // S2 — replay idéntico: no debe reescribir ni generar fan-out.
    processor.handle_message(&s1).await?;

    // S3 — actualización de un subesquema existente.
    let s3 = serde_json::json!({"id": "CLI001", "info": "world"});
    processor.handle_message(&s3).await?;
    print_unified(processor, "CLI001").await;

    Ok(())
}

async fn print_unified<S, B>(processor: &flow_core::RuleProcessor<demo::Cliente, S, B>, id: &str)
where
    S: flow_core::DocumentStore<demo::Cliente>,
    B: flow_core::BrokerClient,
{
    match processor.store().get_unified(id).await {
        Ok(Some(record)) => println!("registro unificado {id}: {record:?}"),
        Ok(None) => println!("registro unificado {id}: (sin datos)"),
        Err(e) => log::error!("error leyendo {id}: {e}"),
    }
}
