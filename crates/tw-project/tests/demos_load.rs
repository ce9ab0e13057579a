use std::path::PathBuf;

use tw_project::{build_transformer, load_yaml, model_kind, sweep_config};
use tw_solver::ModelKind;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos/projects")
        .join(name)
}

#[test]
fn disc_winding_builds() {
    let project = load_yaml(&demo("disc_winding.yaml")).unwrap();
    let topo = build_transformer(&project).unwrap().finalize().unwrap();

    assert_eq!(topo.num_turns(), 20);
    // D1 start, tap T5, D1 end = D2 start, D2 end
    assert_eq!(topo.num_nodes(), 4);
    assert_eq!(topo.terminals().len(), 2);
    assert!(topo.source().is_ok());
    assert_eq!(model_kind(&project), ModelKind::Mtl);
    assert_eq!(sweep_config(&project).num_steps, 20);
}

#[test]
fn tapped_helix_builds() {
    let project = load_yaml(&demo("helix_taps.yaml")).unwrap();
    let topo = build_transformer(&project).unwrap().finalize().unwrap();

    assert_eq!(topo.num_turns(), 12);
    assert_eq!(topo.branches().len(), 3);
    assert_eq!(topo.loads().count(), 2);
    assert_eq!(model_kind(&project), ModelKind::Lumped);
}
