mod tile_grid_tests;
