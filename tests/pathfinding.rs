mod pathfinding {
  use aeropath::data::{LineSegment, Obstacle, ObstacleSet, Point, Polygon};
  use aeropath::planner::{Path, Planner};
  use aeropath::Error;
  use claims::{assert_ok, assert_some};

  fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
  }

  fn obstacle(vertices: &[[f64; 2]], height: f64) -> Obstacle {
    let points = vertices.iter().map(|&c| Point::new(c)).collect();
    assert_ok!(Obstacle::new(assert_ok!(Polygon::new(points)), height))
  }

  fn assert_path_eq(path: &Path<3>, expected: &[[f64; 3]]) {
    assert_eq!(
      path.len(),
      expected.len(),
      "path {:?} differs from expected {:?}",
      path,
      expected
    );
    for (got, want) in path.iter().zip(expected.iter()) {
      assert!(
        got.approx_eq(&Point::new(*want), 1e-6),
        "path {:?} differs from expected {:?}",
        path,
        expected
      );
    }
  }

  /// Every edge of a valid path only touches obstacles at its endpoints.
  fn assert_path_valid(obstacles: &ObstacleSet, path: &Path<3>) {
    for pair in path.windows(2) {
      if let Some(hit) = obstacles.intersect_segment(&LineSegment::new(pair[0], pair[1])) {
        assert!(
          hit.approx_eq(&pair[0], 1e-6) || hit.approx_eq(&pair[1], 1e-6),
          "edge {:?}-{:?} crosses an obstacle at {:?}",
          pair[0],
          pair[1],
          hit
        );
      }
    }
  }

  fn single_block() -> ObstacleSet {
    ObstacleSet::new(vec![obstacle(
      &[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]],
      1.0,
    )])
  }

  #[test]
  fn single_obstacle_go_around() {
    init_logging();
    let obstacles = single_block();
    let origin = Point::new([-1.0, 0.3, 0.0]);
    let target = Point::new([2.0, 0.3, 0.0]);

    let path = assert_ok!(Planner::VisibilityGraph3d.find_path(&obstacles, &origin, &target));
    assert_path_eq(
      &path,
      &[
        [-1.0, 0.3, 0.0],
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [2.0, 0.3, 0.0],
      ],
    );
    assert_path_valid(&obstacles, &path);
  }

  #[test]
  fn two_obstacles_climb_over_the_lower() {
    init_logging();
    let obstacles = ObstacleSet::new(vec![
      obstacle(&[[-5.0, 0.0], [-4.0, 1.0], [-3.0, 0.0], [-4.0, -1.0]], 2.0),
      obstacle(&[[-1.0, 2.0], [1.0, 2.0], [1.0, -2.0], [-1.0, -2.0]], 1.0),
    ]);
    let origin = Point::new([-7.0, 0.0, 0.0]);
    let target = Point::new([3.0, 1.0, 0.0]);

    let path = assert_ok!(Planner::VisibilityGraph3d.find_path(&obstacles, &origin, &target));
    assert_path_eq(
      &path,
      &[
        [-7.0, 0.0, 0.0],
        [-4.0, 1.0, 1.0],
        [-1.0, 1.0, 1.0],
        [1.0, 1.0, 1.0],
        [3.0, 1.0, 0.0],
      ],
    );
    assert_path_valid(&obstacles, &path);
  }

  #[test]
  fn concave_obstacle_leave_the_mouth() {
    init_logging();
    let obstacles = ObstacleSet::new(vec![obstacle(
      &[
        [0.0, 0.0],
        [-3.0, 0.0],
        [-3.0, 1.0],
        [-1.0, 1.0],
        [-1.0, 2.0],
        [-3.0, 2.0],
        [-3.0, 3.0],
        [0.0, 3.0],
      ],
      8.0,
    )]);
    let origin = Point::new([-1.5, 1.5, 0.0]);
    let target = Point::new([0.5, 2.0, 0.0]);

    let path = assert_ok!(Planner::VisibilityGraph3d.find_path(&obstacles, &origin, &target));
    assert_path_eq(
      &path,
      &[
        [-1.5, 1.5, 0.0],
        [-3.0, 2.0, 0.0],
        [-3.0, 3.0, 0.0],
        [0.0, 3.0, 0.0],
        [0.5, 2.0, 0.0],
      ],
    );
    assert_path_valid(&obstacles, &path);
  }

  #[test]
  fn nested_prisms_fly_over_the_inner() {
    init_logging();
    let obstacles = ObstacleSet::new(vec![
      obstacle(&[[0.0, 0.0], [0.0, 11.0], [5.0, 11.0], [5.0, 0.0]], 1.0),
      obstacle(&[[2.0, 1.0], [2.0, 10.0], [3.0, 10.0], [3.0, 1.0]], 2.0),
    ]);
    let origin = Point::new([-1.0, 2.0, 0.0]);
    let target = Point::new([6.0, 9.0, 0.0]);

    let path = assert_ok!(Planner::VisibilityGraph3d.find_path(&obstacles, &origin, &target));
    assert_path_eq(
      &path,
      &[
        [-1.0, 2.0, 0.0],
        [0.0, 3.0, 1.0],
        [2.0, 5.0, 2.0],
        [3.0, 6.0, 2.0],
        [5.0, 8.0, 1.0],
        [6.0, 9.0, 0.0],
      ],
    );
    assert_path_valid(&obstacles, &path);
  }

  #[test]
  fn baseline_filter_matches_on_single_obstacle() {
    init_logging();
    let obstacles = single_block();
    let origin = Point::new([-1.0, 0.3, 0.0]);
    let target = Point::new([2.0, 0.3, 0.0]);

    let path = assert_ok!(Planner::BaselineFilter.find_path(&obstacles, &origin, &target));
    assert_path_eq(
      &path,
      &[
        [-1.0, 0.3, 0.0],
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [2.0, 0.3, 0.0],
      ],
    );
    assert_path_valid(&obstacles, &path);
  }

  #[test]
  fn edge_sampling_matches_on_single_obstacle() {
    init_logging();
    let obstacles = single_block();
    let origin = Point::new([-1.0, 0.3, 0.0]);
    let target = Point::new([2.0, 0.3, 0.0]);

    let path = assert_ok!(Planner::EdgeSampling.find_path(&obstacles, &origin, &target));
    assert_path_eq(
      &path,
      &[
        [-1.0, 0.3, 0.0],
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [2.0, 0.3, 0.0],
      ],
    );
    assert_path_valid(&obstacles, &path);
  }

  // The plane-cut planner needs airborne queries: with the axis on the
  // ground, every cut grazes the prism bases and every lifted detour gets
  // rejected for dipping underground.
  #[test]
  fn plane_cut_is_valid_and_bounded_below() {
    init_logging();
    let obstacles = single_block();
    let origin = Point::new([-1.0, 0.3, 0.5]);
    let target = Point::new([2.0, 0.3, 0.5]);

    let path = assert_ok!(Planner::PlaneCut.find_path(&obstacles, &origin, &target));
    assert!(assert_some!(path.first()).approx_eq(&origin, 1e-9));
    assert!(assert_some!(path.last()).approx_eq(&target, 1e-9));
    assert!(path.length() >= origin.distance_to(&target) - 1e-9);
    assert_path_valid(&obstacles, &path);
  }

  #[test]
  fn plane_cut_on_taller_scene() {
    init_logging();
    let obstacles = ObstacleSet::new(vec![
      obstacle(&[[-5.0, 0.0], [-4.0, 1.0], [-3.0, 0.0], [-4.0, -1.0]], 2.0),
      obstacle(&[[-1.0, 2.0], [1.0, 2.0], [1.0, -2.0], [-1.0, -2.0]], 1.0),
    ]);
    let origin = Point::new([-7.0, 0.0, 0.5]);
    let target = Point::new([3.0, 1.0, 0.5]);

    let path = assert_ok!(Planner::PlaneCut.find_path(&obstacles, &origin, &target));
    assert!(path.length() >= origin.distance_to(&target) - 1e-9);
    assert_path_valid(&obstacles, &path);
  }

  #[test]
  fn all_planners_see_the_empty_scene() {
    init_logging();
    let obstacles = ObstacleSet::default();
    let origin = Point::new([0.0, 0.0, 0.0]);
    let target = Point::new([3.0, 4.0, 0.0]);
    for planner in [
      Planner::VisibilityGraph3d,
      Planner::PlaneCut,
      Planner::BaselineFilter,
      Planner::EdgeSampling,
    ] {
      let path = assert_ok!(planner.find_path(&obstacles, &origin, &target));
      assert!((path.length() - 5.0).abs() < 1e-9, "{:?}", planner);
      assert!(assert_some!(path.first()).approx_eq(&origin, 1e-9));
      assert!(assert_some!(path.last()).approx_eq(&target, 1e-9));
    }
  }

  #[test]
  fn planner_errors_carry_context() {
    init_logging();
    // Obstacle construction failures surface as InvalidInput before any
    // planner runs.
    let polygon_err = Polygon::new(vec![Point::new([0.0, 0.0])]).unwrap_err();
    assert!(matches!(polygon_err.root(), Error::InvalidInput(_)));

    let shape = assert_ok!(Polygon::new(vec![
      Point::new([0.0, 0.0]),
      Point::new([0.0, 1.0]),
      Point::new([1.0, 1.0]),
    ]));
    let obstacle_err = Obstacle::new(shape, -1.0).unwrap_err();
    assert!(matches!(obstacle_err.root(), Error::InvalidInput(_)));
  }

  #[test]
  fn higher_origin_and_target_heights_are_layers() {
    init_logging();
    let obstacles = single_block();
    let origin = Point::new([-1.0, 0.5, 0.5]);
    let target = Point::new([2.0, 0.5, 1.5]);

    let path = assert_ok!(Planner::VisibilityGraph3d.find_path(&obstacles, &origin, &target));
    assert!(assert_some!(path.first()).approx_eq(&origin, 1e-9));
    assert!(assert_some!(path.last()).approx_eq(&target, 1e-9));
    assert_path_valid(&obstacles, &path);
  }
}
