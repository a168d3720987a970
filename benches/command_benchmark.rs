use criterion::{criterion_group, criterion_main, Criterion};
use stratum::command::{CreateNodeCommand, SearchNodeCommand};
use stratum::graph::{keys, PropertyMap};
use stratum::index::IndexKind;
use stratum::security::SecurityContext;
use stratum::service::GraphService;

fn bench_create_nodes(c: &mut Criterion) {
    c.bench_function("create_100_nodes_one_tx", |b| {
        b.iter(|| {
            let service = GraphService::new_default();
            let security = SecurityContext::super_user();
            service
                .transaction(security)
                .execute(|ctx| {
                    let command =
                        CreateNodeCommand::new(ctx.service(), ctx.security().clone());
                    for i in 0..100 {
                        let mut props = PropertyMap::new();
                        props.insert(keys::TYPE.to_string(), "Page".into());
                        props.insert(keys::NAME.to_string(), format!("page-{}", i).into());
                        command.execute(ctx, props)?;
                    }
                    Ok(())
                })
                .unwrap();
        })
    });
}

fn bench_indexed_search(c: &mut Criterion) {
    let service = GraphService::new_default();
    let security = SecurityContext::super_user();
    service
        .transaction(security.clone())
        .execute(|ctx| {
            let command = CreateNodeCommand::new(ctx.service(), ctx.security().clone());
            for i in 0..1_000 {
                let mut props = PropertyMap::new();
                props.insert(keys::TYPE.to_string(), "Page".into());
                props.insert(
                    keys::NAME.to_string(),
                    format!("page-{}", i % 10).into(),
                );
                command.execute(ctx, props)?;
            }
            Ok(())
        })
        .unwrap();

    c.bench_function("exact_search_1k_nodes", |b| {
        b.iter(|| {
            service
                .transaction(security.clone())
                .execute(|ctx| {
                    let search =
                        SearchNodeCommand::new(ctx.service(), ctx.security().clone());
                    let result = search.exact(
                        ctx,
                        IndexKind::Keyword,
                        keys::NAME,
                        &"page-3".into(),
                        0,
                        0,
                    )?;
                    Ok(result.len())
                })
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_create_nodes, bench_indexed_search);
criterion_main!(benches);
