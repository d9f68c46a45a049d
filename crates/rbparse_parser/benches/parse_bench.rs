//! Parser benchmarks.
//!
//! Run with: cargo bench -p rbparse_parser

use bumpalo::Bump;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rbparse_config::ParseOptions;
use rbparse_parser::Parser;

/// Small Ruby source for micro-benchmarks.
const SMALL_SOURCE: &str = r##"
x = 42
greeting = "hello #{x}"
def add(a, b) = a + b
puts add(1, 2)
"##;

/// Medium Ruby source covering definitions, blocks and pattern matching.
const MEDIUM_SOURCE: &str = r##"
# frozen_string_literal: true

module Shapes
  class Circle
    attr_reader :radius

    def initialize(radius)
      @radius = radius
    end

    def area = Math::PI * radius ** 2
  end

  class Rectangle
    def initialize(width:, height:)
      @width, @height = width, height
    end

    def area
      @width * @height
    rescue NoMethodError => e
      warn e.message
      0
    end
  end

  def self.total_area(shapes)
    shapes.sum { |shape| shape.area }
  end

  def self.describe(shape)
    case shape
    in { kind: :circle, radius: Integer | Float => r } if r > 0
      "circle of radius #{r}"
    in [Integer => w, Integer => h]
      "rectangle #{w}x#{h}"
    else
      "unknown"
    end
  end
end

shapes = [Shapes::Circle.new(2), Shapes::Rectangle.new(width: 3, height: 4)]
shapes.each_with_index do |shape, index|
  next if shape.nil?
  puts "#{index}: #{shape.area.round(2)}"
end

total = Shapes.total_area(shapes) unless shapes.empty?
%w[a b c].map(&:upcase).each { |letter| print letter }
"##;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    let options = ParseOptions::default();

    for (name, source) in [("small", SMALL_SOURCE), ("medium", MEDIUM_SOURCE)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, source| {
            b.iter(|| {
                let arena = Bump::new();
                let result = Parser::new(&arena, black_box(source.as_bytes()), &options).parse();
                black_box(result.errors.len());
            });
        });
    }

    group.finish();
}

fn bench_parse_scaled(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_scaled");
    let options = ParseOptions::default();

    for copies in [1usize, 10, 100] {
        let source = MEDIUM_SOURCE.repeat(copies);
        group.bench_with_input(BenchmarkId::from_parameter(copies), &source, |b, source| {
            b.iter(|| {
                let arena = Bump::new();
                let result = Parser::new(&arena, black_box(source.as_bytes()), &options).parse();
                black_box(result.root);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_parse_scaled);
criterion_main!(benches);
