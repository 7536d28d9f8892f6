//! Compiled-in AP coordinates for the campus network.

/// `(name, latitude, longitude)`. Campus-level rows double as the fallback
/// for APs without an entry of their own.
pub(super) const ENTRIES: &[(&str, f64, f64)] = &[
    // 前湖北
    ("前湖北-艺术楼-b-2f-02", 28.6329, 115.8372),
    ("前湖北-图书馆-A1901-C1", 28.6342, 115.8385),
    ("前湖北-理科楼-6f-a-05", 28.6335, 115.8390),
    ("前湖北-理科楼-7f-a-10", 28.6337, 115.8392),
    ("前湖北-慧源楼-519-C1", 28.6350, 115.8380),
    ("前湖北-慧源楼-5FBMZL-2", 28.6352, 115.8382),
    ("前湖北-慧源楼-315-C1", 28.6348, 115.8378),
    ("前湖北-材料环境楼-C349B-1", 28.6340, 115.8395),
    ("前湖北-文法楼-2F-A243", 28.6325, 115.8365),
    ("前湖北-文法楼-3F-A320", 28.6327, 115.8367),
    ("前湖北-前湖图书馆-3f-a0305", 28.6345, 115.8388),
    ("前湖北-智华科技楼-ap720-l-A-05F-7", 28.6355, 115.8400),
    // 前湖南
    ("前湖南-第一教学大楼-101-G1", 28.6310, 115.8360),
    ("前湖南-第一教学大楼-403-G1", 28.6312, 115.8362),
    // 青山湖北
    ("青山湖北-软件楼-518-G4", 28.6800, 115.9200),
    ("青山湖北-软件楼-120-G4", 28.6795, 115.9195),
    ("青山湖北-分析测试中心-6f-02", 28.6810, 115.9210),
    ("青山湖北-分析测试中心-6f-03", 28.6812, 115.9212),
    ("青山湖北-生物楼", 28.6785, 115.9180),
    ("青山湖北-化学楼", 28.6790, 115.9190),
    ("青山湖北-物理楼", 28.6805, 115.9205),
    // 东湖南
    ("东湖南-基础楼4F-06", 28.7200, 115.8800),
    ("东湖南-继教楼-201-C1", 28.7205, 115.8805),
    ("东湖南-图书馆-103-C2", 28.7210, 115.8810),
    // campus defaults
    ("前湖北", 28.6340, 115.8380),
    ("前湖南", 28.6310, 115.8360),
    ("青山湖北", 28.6800, 115.9200),
    ("东湖南", 28.7200, 115.8800),
];
