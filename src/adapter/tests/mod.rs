mod tiff_adapter_tests;
