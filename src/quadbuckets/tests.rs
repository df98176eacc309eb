use super::*;
use crate::{
    bbox::{BBox, Bounded, LatLon},
    config::Config,
    quad_tiling::{NE_INDEX, SE_INDEX, SW_INDEX},
};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[derive(Copy, Clone, Debug, PartialEq)]
struct Item {
    id: u32,
    bbox: BBox,
}
impl Bounded for Item {
    fn bbox(&self) -> BBox {
        self.bbox
    }
}

fn item(id: u32, lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> Item {
    Item {
        id,
        bbox: BBox::from_coords(lon1, lat1, lon2, lat2),
    }
}
fn point(id: u32, lat: f64, lon: f64) -> Item {
    Item {
        id,
        bbox: BBox::from_point(LatLon::new(lat, lon)),
    }
}
fn ids<'a>(found: impl IntoIterator<Item = &'a Item>) -> Vec<u32> {
    let mut ids: Vec<_> = found.into_iter().map(|x| x.id).collect();
    ids.sort_unstable();
    ids
}
fn brute_force(items: &[Item], query: &BBox) -> Vec<u32> {
    ids(items.iter().filter(|x| x.bbox.intersects(query)))
}
/// Integer coordinates land on quadrant boundaries often, which is where bucket assignment gets tricky.
fn random_box(rng: &mut StdRng, max_size: i32) -> BBox {
    let lon = rng.random_range(-180..180 - max_size);
    let lat = rng.random_range(-90..90 - max_size);
    let width = rng.random_range(0..=max_size);
    let height = rng.random_range(0..=max_size);
    BBox::from_coords(
        f64::from(lon),
        f64::from(lat),
        f64::from(lon + width),
        f64::from(lat + height),
    )
}

#[test]
fn basic() {
    let mut buckets = QuadBuckets::new();
    assert!(buckets.is_empty());
    buckets.add(point(1, 48.85, 2.35));
    buckets.add(point(2, 40.71, -74.0));
    assert_eq!(buckets.len(), 2);
    assert!(buckets.contains(&point(1, 48.85, 2.35)));
    assert!(!buckets.contains(&point(3, 48.85, 2.35)));

    let europe = BBox::from_coords(-10.0, 35.0, 30.0, 60.0);
    assert_eq!(ids(buckets.search(&europe)), [1]);
    assert_eq!(ids(buckets.search(&BBox::world())), [1, 2]);
}

#[test]
fn search_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(1987);
    let mut buckets = QuadBuckets::new();
    let mut items = Vec::new();
    for id in 0..3000 {
        let max_size = if id % 10 == 0 { 40 } else { 3 };
        let entity = Item {
            id,
            bbox: random_box(&mut rng, max_size),
        };
        buckets.add(entity);
        items.push(entity);
    }
    assert_eq!(buckets.len(), items.len());

    for round in 0..400 {
        let max_size = [0, 1, 5, 30, 120][round % 5];
        let query = random_box(&mut rng, max_size);
        let expected = brute_force(&items, &query);
        assert_eq!(ids(buckets.search(&query)), expected, "query {}", query);
        assert_eq!(ids(buckets.search_uncached(&query)), expected, "query {}", query);
        // Starts from the bucket cached by the previous search
        assert_eq!(ids(buckets.search(&query)), expected, "query {}", query);

        if round % 4 == 0 {
            let victim = items.swap_remove(rng.random_range(0..items.len()));
            assert!(buckets.remove(&victim));
            assert_eq!(buckets.len(), items.len());
        }
    }
}

#[test]
fn search_touching_a_quadrant_edge() {
    let mut buckets = QuadBuckets::new();
    for i in 0..20 {
        buckets.add(point(i, -5.0 - f64::from(i) * 0.1, -5.0 - f64::from(i) * 0.1));
    }
    // Lies on the boundary between the south-west and south-east quadrants, so it belongs to the latter
    buckets.add(point(100, -7.0, 0.0));
    assert!(buckets.root().is_branch());
    assert_eq!(
        buckets.root().nth_child(SE_INDEX).map(|x| x.content().len()),
        Some(1),
    );

    // Leaves the south-west quadrant in the cache
    let inner = BBox::from_coords(-10.0, -10.0, -4.0, -4.0);
    assert_eq!(buckets.search(&inner).len(), 20);
    let touching = BBox::from_coords(-10.0, -10.0, 0.0, -4.0);
    assert_eq!(buckets.search(&touching).len(), 21);
    assert!(ids(buckets.search(&touching)).contains(&100));
}

#[test]
fn iteration_visits_everything_once() {
    let mut rng = StdRng::seed_from_u64(2014);
    let items: Vec<_> = (0..500)
        .map(|id| Item {
            id,
            bbox: random_box(&mut rng, 10),
        })
        .collect();
    let buckets: QuadBuckets<_> = items.iter().copied().collect();
    let iter = buckets.iter();
    assert_eq!(iter.len(), 500);
    assert_eq!(ids(iter), (0..500).collect::<Vec<u32>>());
    assert_eq!(ids(&buckets), ids(buckets.to_vec()));
    assert_eq!(QuadBuckets::<Item>::new().iter().next(), None);
}

#[test]
fn empty_buckets_are_unlinked() {
    let mut rng = StdRng::seed_from_u64(83);
    let items: Vec<_> = (0..300)
        .map(|id| Item {
            id,
            bbox: random_box(&mut rng, 2),
        })
        .collect();
    let mut buckets = QuadBuckets::new();
    buckets.add_all(items.iter().copied());
    assert!(buckets.node_count() > 1);

    assert!(buckets.remove_all(&items));
    assert!(buckets.is_empty());
    assert_eq!(buckets.node_count(), 1);
    let root = buckets.root();
    assert!(!root.has_children());
    assert!(root.content().is_empty());
    assert!(buckets.search(&BBox::world()).is_empty());
    assert!(buckets.num_holes() > 0);
}

#[test]
fn holes_are_reused_by_recreated_buckets() {
    let mut rng = StdRng::seed_from_u64(87);
    let mut random_point = |id: u32, sign: f64| {
        let lat = rng.random_range(1.0..89.0) * sign;
        let lon = rng.random_range(1.0..179.0) * sign;
        point(id, lat, lon)
    };
    let north_east: Vec<_> = (0..100).map(|id| random_point(id, 1.0)).collect();
    let south_west: Vec<_> = (100..200).map(|id| random_point(id, -1.0)).collect();
    let mut buckets: QuadBuckets<_> = north_east.iter().chain(&south_west).copied().collect();
    assert!(buckets.root().nth_child(SW_INDEX).is_some());
    let full_count = buckets.node_count();

    // The north-east quadrant keeps the root populated, so the south-west one is recreated below it
    assert!(buckets.remove_all(&south_west));
    assert!(buckets.root().nth_child(SW_INDEX).is_none());
    assert!(buckets.root().nth_child(NE_INDEX).is_some());
    let holes = buckets.num_holes();
    assert!(holes > 0);
    assert_eq!(buckets.node_count(), full_count - holes);

    buckets.add_all(south_west.iter().copied());
    assert!(buckets.root().nth_child(SW_INDEX).is_some());
    assert!(buckets.num_holes() < holes);
    assert_eq!(buckets.len(), 200);
    let quadrant = BBox::from_coords(-180.0, -90.0, -0.5, -0.5);
    assert_eq!(ids(buckets.search(&quadrant)), (100..200).collect::<Vec<u32>>());
}

#[test]
fn split_happens_past_the_threshold() {
    let mut buckets = QuadBuckets::new();
    let in_sw = |i: u32| point(i, -10.0 - f64::from(i), -20.0 - f64::from(i));
    for i in 0..16 {
        buckets.add(in_sw(i));
    }
    assert!(buckets.root().is_leaf());
    assert_eq!(buckets.root().content().len(), 16);

    buckets.add(in_sw(16));
    let root = buckets.root();
    assert!(root.is_branch());
    assert!(root.content().is_empty());
    let sw = root.nth_child(SW_INDEX).expect("south-west bucket was created");
    assert_eq!(sw.level(), 1);
    assert_eq!(sw.parent().map(|x| x.raw_key()), Some(root.raw_key()));
    assert_eq!(sw.bbox(), BBox::from_coords(-180.0, -90.0, 0.0, 0.0));
    assert!(root.nth_child(NE_INDEX).is_none());

    let quadrant = BBox::from_coords(-180.0, -90.0, -1.0, -1.0);
    assert_eq!(ids(buckets.search(&quadrant)), (0..17).collect::<Vec<u32>>());
}

#[test]
fn straddling_entities_stay_high() {
    let mut buckets = QuadBuckets::new();
    buckets.add(item(0, -170.0, -80.0, 170.0, 80.0));
    for i in 1..=20 {
        let x = f64::from(i);
        buckets.add(item(i, x, x, x + 0.5, x + 0.5));
    }
    let root = buckets.root();
    assert!(root.is_branch());
    assert_eq!(ids(root.content()), [0]);

    let small = BBox::from_coords(5.1, 5.1, 5.2, 5.2);
    assert_eq!(ids(buckets.search(&small)), [0, 5]);
    let elsewhere = BBox::from_coords(-100.0, -50.0, -99.0, -49.0);
    assert_eq!(ids(buckets.search(&elsewhere)), [0]);
}

#[test]
fn world_spanning_entity_stays_in_the_root() {
    let mut buckets = QuadBuckets::new();
    buckets.add(item(0, -180.0, -90.0, 180.0, 90.0));
    for i in 1..=20 {
        let x = f64::from(i);
        buckets.add(item(i, x, x, x + 0.5, x + 0.5));
        buckets.add(item(i + 100, -x, -x, -x - 0.5, -x - 0.5));
    }
    let root = buckets.root();
    assert!(root.is_branch());
    assert_eq!(ids(root.content()), [0]);

    assert_eq!(ids(buckets.search(&BBox::from_coords(7.1, 7.1, 7.2, 7.2))), [0, 7]);
    assert_eq!(ids(buckets.search(&BBox::from_coords(-7.1, -7.1, -7.2, -7.2))), [0, 107]);
    // Corners of the world lie on closed edges
    let north_east_corner = BBox::from_point(LatLon::new(90.0, 180.0));
    assert_eq!(ids(buckets.search(&north_east_corner)), [0]);
    let south_west_corner = BBox::from_point(LatLon::new(-90.0, -180.0));
    assert_eq!(ids(buckets.search(&south_west_corner)), [0]);
    assert_eq!(buckets.search(&BBox::world()).len(), 41);
    assert!(buckets.remove(&item(0, -180.0, -90.0, 180.0, 90.0)));
    assert!(buckets.search(&north_east_corner).is_empty());
}

#[test]
fn shared_searches_from_several_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<QuadBuckets<Item>>();

    let mut rng = StdRng::seed_from_u64(2010);
    let items: Vec<_> = (0..2000)
        .map(|id| Item {
            id,
            bbox: random_box(&mut rng, 4),
        })
        .collect();
    let buckets: QuadBuckets<_> = items.iter().copied().collect();
    let queries: Vec<Vec<_>> = (0..4)
        .map(|_| (0..500).map(|_| random_box(&mut rng, 15)).collect())
        .collect();

    std::thread::scope(|scope| {
        for queries in &queries {
            let buckets = &buckets;
            let items = &items;
            scope.spawn(move || {
                for query in queries {
                    // Every thread keeps overwriting the cache the others start from
                    assert_eq!(ids(buckets.search(query)), brute_force(items, query), "query {}", query);
                }
            });
        }
    });
    assert_eq!(buckets.len(), 2000);
}

#[test]
fn remove_is_idempotent() {
    let mut buckets = QuadBuckets::new();
    let entity = item(7, 10.0, 10.0, 11.0, 11.0);
    buckets.add(entity);
    buckets.add(item(8, 10.0, 10.0, 11.0, 11.0));
    assert_eq!(buckets.take(&entity), Some(entity));
    assert!(!buckets.remove(&entity));
    assert_eq!(buckets.len(), 1);
    assert!(!buckets.remove(&item(9, 50.0, 50.0, 51.0, 51.0)));
    assert_eq!(buckets.len(), 1);
}

#[test]
fn duplicates() {
    let mut buckets = QuadBuckets::new();
    let entity = point(1, 1.0, 1.0);
    assert!(buckets.add(entity));
    assert!(buckets.add(entity));
    assert_eq!(buckets.len(), 2);
    assert!(buckets.remove(&entity));
    assert!(buckets.contains(&entity));
    assert_eq!(buckets.search(&entity.bbox).len(), 1);
}

#[test]
fn cursor_removal() {
    let mut rng = StdRng::seed_from_u64(451);
    let items: Vec<_> = (0..400)
        .map(|id| Item {
            id,
            bbox: random_box(&mut rng, 4),
        })
        .collect();
    let mut buckets: QuadBuckets<_> = items.iter().copied().collect();
    // Populates the cache, which removals have to invalidate
    buckets.search(&items[3].bbox);

    let mut seen = Vec::new();
    let mut removed = Vec::new();
    let mut cursor = buckets.cursor_mut();
    assert_eq!(cursor.remove_current(), None);
    while let Some(entity) = cursor.advance() {
        let id = entity.id;
        seen.push(id);
        if id % 2 == 0 {
            let taken = cursor.remove_current().map(|x| x.id);
            assert_eq!(taken, Some(id));
            assert_eq!(cursor.remove_current(), None);
            removed.push(id);
        }
    }
    assert_eq!(cursor.peek(), None);
    seen.sort_unstable();
    assert_eq!(seen, (0..400).collect::<Vec<u32>>());
    assert_eq!(removed.len(), 200);
    assert_eq!(buckets.len(), 200);

    let remaining: Vec<_> = items.iter().copied().filter(|x| x.id % 2 == 1).collect();
    assert_eq!(ids(&buckets), ids(&remaining));
    for _ in 0..50 {
        let query = random_box(&mut rng, 20);
        assert_eq!(ids(buckets.search(&query)), brute_force(&remaining, &query));
    }
}

#[test]
fn cursor_peek_matches_advance() {
    let mut buckets: QuadBuckets<_> = (0..40).map(|i| point(i, 0.5, f64::from(i))).collect();
    let mut cursor = buckets.cursor_mut();
    let peeked = cursor.peek().map(|x| x.id);
    assert!(peeked.is_some());
    assert_eq!(cursor.advance().map(|x| x.id), peeked);
    while cursor.advance().is_some() {
        cursor.remove_current();
    }
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets.iter().next().map(|x| x.id), peeked);
}

#[test]
fn retain_and_retain_all() {
    let items: Vec<_> = (0..100).map(|i| point(i, f64::from(i) - 50.0, f64::from(i))).collect();
    let mut buckets: QuadBuckets<_> = items.iter().copied().collect();
    assert!(buckets.retain(|x| x.id < 60));
    assert!(!buckets.retain(|x| x.id < 60));
    assert_eq!(buckets.len(), 60);

    let keep = [items[3], items[10], items[99]];
    assert!(buckets.retain_all(&keep));
    assert_eq!(ids(&buckets), [3, 10]);
    assert!(!buckets.retain_all(&keep));
    assert!(buckets.contains_all(&keep[..2]));
    assert!(!buckets.contains_all(&keep));
}

#[test]
fn search_outside_the_world() {
    let mut buckets: QuadBuckets<_> = (0..50).map(|i| point(i, 89.0, 179.0 - f64::from(i))).collect();
    assert!(buckets.search(&BBox::from_coords(200.0, 100.0, 210.0, 110.0)).is_empty());
    // Partially outside
    let across_the_edge = BBox::from_coords(175.5, 80.0, 250.0, 95.0);
    assert_eq!(ids(buckets.search(&across_the_edge)), [0, 1, 2, 3]);
    buckets.clear();
    assert!(buckets.search(&across_the_edge).is_empty());
}

#[test]
fn clear() {
    let mut buckets: QuadBuckets<_> = (0..100).map(|i| point(i, 0.0, f64::from(i))).collect();
    assert!(buckets.node_count() > 1);
    buckets.clear();
    assert!(buckets.is_empty());
    assert_eq!(buckets.node_count(), 1);
    assert!(buckets.root().is_leaf());
    buckets.add(point(1, 0.0, 0.0));
    assert_eq!(buckets.len(), 1);
}

#[test]
fn level_limit() {
    let config = Config::new()
        .with_max_level(0)
        .expect("level 0 is always available");
    let mut buckets = QuadBuckets::with_config(config);
    buckets.extend((0..100).map(|i| point(i, 1.0, f64::from(i))));
    assert!(buckets.root().is_leaf());
    assert_eq!(buckets.node_count(), 1);
    assert_eq!(buckets.root().content().len(), 100);
    assert_eq!(buckets.search(&BBox::from_coords(9.5, 0.0, 12.5, 2.0)).len(), 3);
}

#[test]
fn small_buckets() {
    let config = Config::new().with_max_objects_per_level(1);
    let mut buckets = QuadBuckets::with_config(config);
    buckets.add(point(1, 10.0, 10.0));
    assert!(buckets.root().is_leaf());
    buckets.add(point(2, 10.0, 10.000_01));
    assert!(buckets.root().is_branch());
    assert!(buckets.node_count() > 3);
    assert_eq!(buckets.search(&BBox::from_point(LatLon::new(10.0, 10.0))).len(), 1);
    assert!(buckets.remove(&point(1, 10.0, 10.0)));
    assert!(buckets.remove(&point(2, 10.0, 10.000_01)));
    assert_eq!(buckets.node_count(), 1);
}

#[test]
fn emptied_branch_keeps_new_entities() {
    let config = Config::new().with_max_objects_per_level(1);
    let mut buckets = QuadBuckets::with_config(config);
    let a = point(1, 10.0, 10.0);
    let b = point(2, -10.0, -10.0);
    buckets.add(a);
    buckets.add(b);
    assert!(buckets.root().has_children());
    assert!(buckets.remove(&a));
    assert!(buckets.remove(&b));
    assert!(buckets.root().is_branch());
    assert!(!buckets.root().has_children());

    // Without children left, the root holds everything regardless of the threshold
    let points: Vec<_> = (0..5).map(|i| point(i, f64::from(i), f64::from(i))).collect();
    buckets.add_all(points.iter().copied());
    assert_eq!(buckets.node_count(), 1);
    assert_eq!(buckets.root().content().len(), 5);
    assert!(buckets.contains_all(&points));
    assert!(buckets.remove_all(&points));
    assert!(buckets.is_empty());
}
