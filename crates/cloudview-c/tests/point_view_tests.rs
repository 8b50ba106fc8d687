//! C ABI tests over an executed reprojection pipeline

use std::collections::HashSet;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use cloudview_c::ffi::iterator::*;
use cloudview_c::ffi::layout::*;
use cloudview_c::ffi::packing::*;
use cloudview_c::ffi::pipeline::*;
use cloudview_c::ffi::view::*;
use cloudview_c::PointViewHandle;
use cloudview_core::{Pipeline, PointViewIterator};
use pretty_assertions::assert_eq;

const SIMPLE_REPROJECT: &str = include_str!("data/simple-reproject.json");

const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs";
const WGS84_WKT: &str = concat!(
    "GEOGCS[\"WGS 84\",",
    "DATUM[\"WGS_1984\",",
    "SPHEROID[\"WGS 84\",6378137,298.257223563,AUTHORITY[\"EPSG\",\"7030\"]],",
    "AUTHORITY[\"EPSG\",\"6326\"]],",
    "PRIMEM[\"Greenwich\",0,AUTHORITY[\"EPSG\",\"8901\"]],",
    "UNIT[\"degree\",0.0174532925199433,AUTHORITY[\"EPSG\",\"9122\"]],",
    "AUTHORITY[\"EPSG\",\"4326\"]]"
);

/// Executed pipeline plus a fresh iterator, freed on drop
struct Fixture {
    pipeline: *mut Pipeline,
    iterator: *mut PointViewIterator,
}

impl Fixture {
    fn new() -> Self {
        let json = CString::new(SIMPLE_REPROJECT).unwrap();
        let pipeline = pipeline_create(json.as_ptr());
        assert!(!pipeline.is_null());
        assert_eq!(pipeline_execute(pipeline), 4);
        let iterator = pipeline_get_point_views(pipeline);
        assert!(!iterator.is_null());
        Self { pipeline, iterator }
    }

    fn next(&self) -> *mut PointViewHandle {
        point_view_iterator_next(self.iterator)
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        point_view_iterator_free(self.iterator);
        pipeline_free(self.pipeline);
    }
}

fn read_string(f: impl Fn(*mut c_char, usize) -> usize) -> (usize, String) {
    let mut buf = vec![b'x' as c_char; 4096];
    let len = f(buf.as_mut_ptr(), buf.len());
    let s = unsafe { CStr::from_ptr(buf.as_ptr()) }.to_str().unwrap().to_string();
    (len, s)
}

#[test]
fn test_iterator_exhaustion_and_reset() {
    let fixture = Fixture::new();
    point_view_iterator_reset(fixture.iterator);
    point_view_iterator_reset(fixture.iterator);

    let mut first = Vec::new();
    while point_view_iterator_has_next(fixture.iterator) {
        let view = fixture.next();
        assert!(!view.is_null());
        first.push(point_view_get_id(view));
        point_view_free(view);
    }
    assert_eq!(first.len(), 3);
    assert!(fixture.next().is_null());
    assert!(!point_view_iterator_has_next(fixture.iterator));

    point_view_iterator_reset(fixture.iterator);
    assert!(point_view_iterator_has_next(fixture.iterator));
    let mut second = Vec::new();
    while point_view_iterator_has_next(fixture.iterator) {
        let view = fixture.next();
        second.push(point_view_get_id(view));
        point_view_free(view);
    }
    assert_eq!(first, second);
}

#[test]
fn test_view_ids_unique_and_nonzero() {
    let fixture = Fixture::new();
    let mut ids = HashSet::new();
    let mut count = 0;
    loop {
        let view = fixture.next();
        if view.is_null() {
            break;
        }
        let id = point_view_get_id(view);
        assert_ne!(id, 0);
        ids.insert(id);
        count += 1;
        point_view_free(view);
    }
    assert_eq!(ids.len(), count);
}

#[test]
fn test_reprojected_strings() {
    let fixture = Fixture::new();
    let view = fixture.next();

    let (len, proj4) = read_string(|buf, cap| point_view_get_proj4(view, buf, cap));
    assert_eq!(proj4, WGS84_PROJ4);
    assert_eq!(len, WGS84_PROJ4.len());

    let (len, compact) = read_string(|buf, cap| point_view_get_wkt(view, buf, cap, false));
    assert_eq!(compact, WGS84_WKT);
    assert_eq!(len, WGS84_WKT.len());

    let (pretty_len, pretty) = read_string(|buf, cap| point_view_get_wkt(view, buf, cap, true));
    assert!(pretty_len > len);
    assert_ne!(pretty, compact);
    assert!(pretty.starts_with("GEOGCS[\"WGS 84\",\n    DATUM["));

    let clone = point_view_clone(view);
    assert_ne!(point_view_get_id(clone), point_view_get_id(view));
    assert_eq!(read_string(|buf, cap| point_view_get_proj4(clone, buf, cap)).1, proj4);
    assert_eq!(read_string(|buf, cap| point_view_get_wkt(clone, buf, cap, false)).1, compact);
    assert_eq!(read_string(|buf, cap| point_view_get_wkt(clone, buf, cap, true)).1, pretty);

    point_view_free(clone);
    point_view_free(view);
}

#[test]
fn test_layout_point_size() {
    let fixture = Fixture::new();
    let view = fixture.next();
    let layout = point_view_get_layout(view);
    assert!(!layout.is_null());
    assert_eq!(point_view_get_layout(view), layout);

    let dims = point_layout_get_dim_types(layout);
    let widths: Vec<usize> = (0..dim_type_list_size(dims))
        .map(|i| dim_type_interpretation_byte_count(dim_type_list_get(dims, i).type_))
        .collect();
    assert_eq!(widths, vec![8, 8, 8, 2, 1]);
    assert_eq!(point_layout_get_point_size(layout), 27);
    assert_eq!(dim_type_list_byte_count(dims), 27);
    point_view_free(view);
}

#[test]
fn test_pack_first_point() {
    let fixture = Fixture::new();
    let view = fixture.next();
    assert_eq!(point_view_get_size(view), 2);
    let dims = point_layout_get_dim_types(point_view_get_layout(view));

    let mut buf = vec![0 as c_char; 27];
    assert_eq!(point_view_get_packed_point(view, dims, 0, buf.as_mut_ptr()), 27);

    let mut expected = Vec::new();
    expected.extend_from_slice(&0.0f64.to_ne_bytes());
    expected.extend_from_slice(&0.0f64.to_ne_bytes());
    expected.extend_from_slice(&125.5f64.to_ne_bytes());
    expected.extend_from_slice(&300u16.to_ne_bytes());
    expected.push(1);
    let packed: Vec<u8> = buf.iter().map(|&b| b as u8).collect();
    assert_eq!(packed, expected);
    point_view_free(view);
}

#[test]
fn test_pack_all_matches_pack_one_for_every_view() {
    let fixture = Fixture::new();
    while point_view_iterator_has_next(fixture.iterator) {
        let view = fixture.next();
        let dims = point_layout_get_dim_types(point_view_get_layout(view));
        let size = dim_type_list_byte_count(dims);
        let n = point_view_get_size(view) as usize;

        let mut bulk = vec![0 as c_char; n * size];
        assert_eq!(point_view_get_all_packed_points(view, dims, bulk.as_mut_ptr()), (n * size) as u64);

        let mut single = vec![0 as c_char; size];
        for i in 0..n {
            assert_eq!(point_view_get_packed_point(view, dims, i as u64, single.as_mut_ptr()), size);
            assert_eq!(&bulk[i * size..(i + 1) * size], single.as_slice());
        }
        assert_eq!(point_view_get_packed_point(view, dims, n as u64, single.as_mut_ptr()), 0);
        point_view_free(view);
    }
}

#[test]
fn test_views_survive_pipeline_free() {
    let json = CString::new(SIMPLE_REPROJECT).unwrap();
    let pipeline = pipeline_create(json.as_ptr());
    pipeline_execute(pipeline);
    let iterator = pipeline_get_point_views(pipeline);
    let view = point_view_iterator_next(iterator);
    point_view_iterator_free(iterator);
    pipeline_free(pipeline);

    assert_eq!(point_view_get_size(view), 2);
    let dims = point_layout_get_dim_types(point_view_get_layout(view));
    let mut buf = vec![0 as c_char; 54];
    assert_eq!(point_view_get_all_packed_points(view, dims, buf.as_mut_ptr()), 54);
    point_view_free(view);
}

#[test]
fn test_null_handles() {
    assert!(point_view_is_empty(ptr::null()));
    assert_eq!(point_view_get_size(ptr::null()), 0);
    assert_eq!(point_view_get_id(ptr::null()), 0);
    assert!(point_view_get_layout(ptr::null()).is_null());
    assert!(point_layout_get_dim_types(ptr::null()).is_null());
    assert_eq!(point_layout_get_point_size(ptr::null()), 0);
    assert_eq!(point_view_get_packed_point(ptr::null(), ptr::null(), 0, ptr::null_mut()), 0);
    assert_eq!(point_view_get_all_packed_points(ptr::null(), ptr::null(), ptr::null_mut()), 0);

    let (len, s) = read_string(|buf, cap| point_view_get_proj4(ptr::null(), buf, cap));
    assert_eq!(len, 0);
    assert_eq!(s, "");
}
