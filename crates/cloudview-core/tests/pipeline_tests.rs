//! End-to-end pipeline tests: description to packed bytes

use std::collections::HashSet;

use cloudview_core::{pack_all, pack_point, DimId, DimType, DimTypeList, DimensionType, Pipeline, Value};
use pretty_assertions::assert_eq;

/// Helper to execute a description and return the pipeline
fn execute(json: &str) -> Pipeline {
    let mut pipeline = Pipeline::from_json(json).unwrap();
    pipeline.execute().unwrap();
    pipeline
}

#[test]
fn test_reproject_mercator_origin() {
    let pipeline = execute(
        r#"{"pipeline":[
            {"type":"readers.inline","spatialreference":"EPSG:3857",
             "dimensions":["X","Y","Z","Intensity"],
             "points":[[0,0,42.5,7],[6378137,0,1,8]]},
            {"type":"filters.reprojection","out_srs":"EPSG:4326"}
        ]}"#,
    );
    let view = pipeline.point_views().unwrap().next().unwrap();
    assert_eq!(view.spatial_reference().proj4(), "+proj=longlat +datum=WGS84 +no_defs");

    let dims = view.layout().dim_types();
    let mut out = vec![0u8; dims.byte_count()];
    assert_eq!(pack_point(&view, dims, 0, &mut out), Ok(26));

    let mut expected = Vec::new();
    expected.extend_from_slice(&0.0f64.to_ne_bytes());
    expected.extend_from_slice(&0.0f64.to_ne_bytes());
    expected.extend_from_slice(&42.5f64.to_ne_bytes());
    expected.extend_from_slice(&7u16.to_ne_bytes());
    assert_eq!(out, expected);
}

#[test]
fn test_groupby_views_pack_consistently() {
    let pipeline = execute(
        r#"[
            {"type":"readers.inline","dimensions":["X","Classification"],
             "points":[[1,2],[2,1],[3,2],[4,3],[5,1]]},
            {"type":"filters.groupby","dimension":"Classification"}
        ]"#,
    );
    let views: Vec<_> = pipeline.point_views().unwrap().collect();
    assert_eq!(views.iter().map(|v| v.len()).collect::<Vec<_>>(), vec![2, 2, 1]);

    let ids: HashSet<u32> = views.iter().map(|v| v.id()).collect();
    assert_eq!(ids.len(), views.len());

    let dims = DimTypeList::new(vec![DimType::new(DimId::X, DimensionType::Double)]);
    for view in &views {
        let mut bulk = vec![0u8; view.len() * 8];
        assert_eq!(pack_all(view, &dims, &mut bulk), Ok(view.len() * 8));
        let mut single = [0u8; 8];
        for i in 0..view.len() {
            pack_point(view, &dims, i, &mut single).unwrap();
            assert_eq!(&bulk[i * 8..(i + 1) * 8], &single);
        }
    }

    // Class 1 first: X values 2 and 5.
    assert_eq!(views[0].table().value(DimId::X, views[0].rows()[1] as usize), Some(Value::Floating(5.0)));
}

#[test]
fn test_faux_merge_head() {
    let pipeline = execute(
        r#"[
            {"type":"readers.faux","count":10,"mode":"ramp","bounds":"([0,9],[0,9],[0,9])"},
            {"type":"readers.faux","count":5},
            {"type":"filters.merge"},
            {"type":"filters.head","count":12}
        ]"#,
    );
    let views = pipeline.views().unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].len(), 12);
    assert_eq!(views[0].layout().point_size(), 30);
}

#[test]
fn test_schema_and_description_export() {
    let pipeline = execute(r#"[{"type":"readers.faux","count":1}]"#);
    let schema = pipeline.schema().unwrap();
    let names: Vec<&str> = schema["schema"]["dimensions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["X", "Y", "Z", "OffsetTime", "ReturnNumber", "NumberOfReturns"]);

    let reparsed = Pipeline::from_json(&pipeline.to_json()).unwrap();
    assert_eq!(reparsed.stages(), pipeline.stages());
}
