/*
This tool is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 24/09/2018
Last Modified: 18/10/2019
License: MIT
*/

use whitebox_raster::*;
use whitebox_common::structures::Point2D;
use crate::tools::core_interop::{append_tail_cell, print_banner, to_core_i16, to_core_i32};
use crate::tools::*;
use whitebox_vector::ShapefileGeometry;
use whitebox_vector::*;
use std::collections::HashSet;
use std::env;
use std::f64;
use std::io::{Error, ErrorKind};
use std::path;
use whitebox_stream_network::dirmap::DirMap;
use whitebox_stream_network::graph::build_from_polylines;
use whitebox_stream_network::hack::hack_order as graph_hack_order;
use whitebox_stream_network::links::label_links;
use whitebox_stream_network::mainstem::label_mainstem;
use whitebox_stream_network::report::NullReporter;
use whitebox_stream_network::strahler::strahler_order;
use whitebox_stream_network::upstream_length_graph::upstream_length;
use whitebox_stream_network::walker::walk;

/// This tool derives stream network geometry from a raster stream/D8 pointer pair and writes it
/// out as a vector line network, one feature per link between stream junctions, carrying the
/// network-wide attributes this crate's graph algorithms compute: Strahler order, Hack order,
/// mainstem membership, and total upstream channel length.
///
/// The user must specify the names of a streams raster image (`--streams`) and D8 pointer image
/// (`--d8_pntr`). Stream cells are designated in the streams image as all positive, nonzero values;
/// the particular values are not preserved in the output (use `RasterStreamsToVector` for that) since
/// this tool re-derives its own link IDs from the network topology. The pointer image is used to
/// traverse the stream network and should only be created using the D8 algorithm (`D8Pointer`).
///
/// By default, the pointer raster is assumed to use the clockwise indexing method used by WhiteboxTools.
/// If the pointer file contains ESRI flow direction values instead, the `--esri_pntr` parameter must be specified.
///
/// # See Also
/// `RasterStreamsToVector`, `StrahlerStreamOrder`, `HackStreamOrder`, `FindMainStem`
pub struct VectorStreamNetworkAnalysis {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl VectorStreamNetworkAnalysis {
    pub fn new() -> VectorStreamNetworkAnalysis {
        // public constructor
        let name = "VectorStreamNetworkAnalysis".to_string();
        let toolbox = "Stream Network Analysis".to_string();
        let description = "Calculates stream network geometry and topology from raster streams.".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Streams File".to_owned(),
            flags: vec!["--streams".to_owned()],
            description: "Input raster streams file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Input D8 Pointer File".to_owned(),
            flags: vec!["--d8_pntr".to_owned()],
            description: "Input raster D8 pointer file.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Raster),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output File".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output vector file.".to_owned(),
            parameter_type: ParameterType::NewFile(ParameterFileType::Vector(
                VectorGeometryType::Line,
            )),
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Does the pointer file use the ESRI pointer scheme?".to_owned(),
            flags: vec!["--esri_pntr".to_owned()],
            description: "D8 pointer uses the ESRI style scheme.".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        let sep: String = path::MAIN_SEPARATOR.to_string();
        let p = format!("{}", env::current_dir().unwrap().display());
        let e = format!("{}", env::current_exe().unwrap().display());
        let mut short_exe = e
            .replace(&p, "")
            .replace(".exe", "")
            .replace(".", "")
            .replace(&sep, "");
        if e.contains(".exe") {
            short_exe += ".exe";
        }
        let usage = format!(">>.*{0} -r={1} -v --wd=\"*path*to*data*\" --streams=streams.tif --d8_pntr=D8.tif -o=output.shp
>>.*{0} -r={1} -v --wd=\"*path*to*data*\" --streams=streams.tif --d8_pntr=D8.tif -o=output.shp --esri_pntr", short_exe, name).replace("*", &sep);

        VectorStreamNetworkAnalysis {
            name: name,
            description: description,
            toolbox: toolbox,
            parameters: parameters,
            example_usage: usage,
        }
    }
}

impl WhiteboxTool for VectorStreamNetworkAnalysis {
    fn get_source_file(&self) -> String {
        String::from(file!())
    }

    fn get_tool_name(&self) -> String {
        self.name.clone()
    }

    fn get_tool_description(&self) -> String {
        self.description.clone()
    }

    fn get_tool_parameters(&self) -> String {
        let mut s = String::from("{\"parameters\": [");
        for i in 0..self.parameters.len() {
            if i < self.parameters.len() - 1 {
                s.push_str(&(self.parameters[i].to_string()));
                s.push_str(",");
            } else {
                s.push_str(&(self.parameters[i].to_string()));
            }
        }
        s.push_str("]}");
        s
    }

    fn get_example_usage(&self) -> String {
        self.example_usage.clone()
    }

    fn get_toolbox(&self) -> String {
        self.toolbox.clone()
    }

    fn run<'a>(
        &self,
        args: Vec<String>,
        working_directory: &'a str,
        verbose: bool,
    ) -> Result<(), Error> {
        let mut d8_file = String::new();
        let mut streams_file = String::new();
        let mut output_file = String::new();
        let mut esri_style = false;

        if args.len() == 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Tool run with no parameters.",
            ));
        }
        for i in 0..args.len() {
            let mut arg = args[i].replace("\"", "");
            arg = arg.replace("\'", "");
            let cmd = arg.split("="); // in case an equals sign was used
            let vec = cmd.collect::<Vec<&str>>();
            let mut keyval = false;
            if vec.len() > 1 {
                keyval = true;
            }
            let flag_val = vec[0].to_lowercase().replace("--", "-");
            if flag_val == "-d8_pntr" {
                d8_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-streams" {
                streams_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-o" || flag_val == "-output" {
                output_file = if keyval {
                    vec[1].to_string()
                } else {
                    args[i + 1].to_string()
                };
            } else if flag_val == "-esri_pntr" || flag_val == "-esri_style" {
                if vec.len() == 1 || !vec[1].to_string().to_lowercase().contains("false") {
                    esri_style = true;
                }
            }
        }

        if verbose {
            print_banner(&self.get_tool_name());
        }

        let sep: String = path::MAIN_SEPARATOR.to_string();

        if !d8_file.contains(&sep) && !d8_file.contains("/") {
            d8_file = format!("{}{}", working_directory, d8_file);
        }
        if !streams_file.contains(&sep) && !streams_file.contains("/") {
            streams_file = format!("{}{}", working_directory, streams_file);
        }
        if !output_file.contains(&sep) && !output_file.contains("/") {
            output_file = format!("{}{}", working_directory, output_file);
        }

        if verbose {
            println!("Reading pointer data...")
        };
        let pntr = Raster::new(&d8_file, "r")?;
        if verbose {
            println!("Reading streams data...")
        };
        let streams = Raster::new(&streams_file, "r")?;

        let start = Instant::now();

        let rows = pntr.configs.rows as isize;
        let columns = pntr.configs.columns as isize;

        // make sure the input files have the same size
        if streams.configs.rows != pntr.configs.rows
            || streams.configs.columns != pntr.configs.columns
        {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The input files must have the same number of rows and columns and spatial extent.",
            ));
        }

        let mut pntr_core = to_core_i16(&pntr);
        if !esri_style {
            const WB_TO_ESRI: [(i16, i16); 8] = [
                (1, 128),
                (2, 1),
                (4, 2),
                (8, 4),
                (16, 8),
                (32, 16),
                (64, 32),
                (128, 64),
            ];
            for row in 0..rows {
                for col in 0..columns {
                    let v = pntr_core.get(row, col);
                    if let Some(&(_, esri)) = WB_TO_ESRI.iter().find(|&&(wb, _)| wb == v) {
                        pntr_core.set(row, col, esri);
                    }
                }
            }
        }
        let streams_core = to_core_i32(&streams);

        if verbose {
            println!("Labeling stream links...")
        };
        let mut reporter = NullReporter;
        let link_labels = label_links(&streams_core, &pntr_core, &mut reporter, None)
            .map_err(|e| Error::new(ErrorKind::InvalidInput, e.to_string()))?;

        let mut segment_ids: Vec<u32> = link_labels
            .iter_cells()
            .map(|(r, c)| link_labels.get(r, c))
            .filter(|&v| v > 0)
            .collect();
        segment_ids.sort_unstable();
        segment_ids.dedup();

        let mut segment_paths: Vec<Vec<(isize, isize)>> = Vec::with_capacity(segment_ids.len());
        for &id in &segment_ids {
            let cells: Vec<(isize, isize)> = link_labels
                .iter_cells()
                .filter(|&(r, c)| link_labels.get(r, c) == id)
                .collect();
            let mask: HashSet<(isize, isize)> = cells.iter().copied().collect();
            let start_cell = cells
                .iter()
                .copied()
                .find(|&(r, c)| {
                    !cells.iter().any(|&(nr, nc)| {
                        (nr, nc) != (r, c) && {
                            let (dr, dc) = DirMap::step(pntr_core.get(nr, nc));
                            (nr + dr, nc + dc) == (r, c)
                        }
                    })
                })
                .unwrap_or(cells[0]);
            let mut path = walk(start_cell, &pntr_core, |next| !mask.contains(&next));
            if path.len() < 2 {
                // an isolated stream cell (both source and outlet) has no line geometry.
                reporter.warn(&format!("link {} is a single isolated cell; skipped", id));
                continue;
            }
            // a confluence cell belongs to the downstream trunk link (links.rs), so
            // an arm's walk stops one cell short of it; extend to share the node.
            append_tail_cell(&mut path, &pntr_core);
            segment_paths.push(path);
        }

        if verbose {
            println!("Building stream graph...")
        };
        let world_polylines: Vec<Vec<(f64, f64)>> = segment_paths
            .iter()
            .map(|path| {
                path.iter()
                    .map(|&(r, c)| streams_core.meta.transform.pixel_to_world(r, c))
                    .collect()
            })
            .collect();
        let mut graph = build_from_polylines(&world_polylines);
        let to_io_err = |e: whitebox_stream_network::CoreError| Error::new(ErrorKind::InvalidInput, e.to_string());
        strahler_order(&mut graph, None).map_err(to_io_err)?;
        upstream_length(&mut graph, None).map_err(to_io_err)?;
        label_mainstem(&mut graph, &mut reporter, None).map_err(to_io_err)?;
        graph_hack_order(&mut graph).map_err(to_io_err)?;

        // create output file
        let mut output = Shapefile::new(&output_file, ShapeType::PolyLine)?;
        output
            .attributes
            .add_field(&AttributeField::new("FID", FieldDataType::Int, 7u8, 0u8));
        output
            .attributes
            .add_field(&AttributeField::new("STRAHLER", FieldDataType::Int, 5u8, 0u8));
        output
            .attributes
            .add_field(&AttributeField::new("HACK", FieldDataType::Int, 5u8, 0u8));
        output
            .attributes
            .add_field(&AttributeField::new("MAINSTEM", FieldDataType::Int, 1u8, 0u8));
        output.attributes.add_field(&AttributeField::new(
            "TUCL",
            FieldDataType::Real,
            12u8,
            3u8,
        ));

        for (i, path) in segment_paths.iter().enumerate() {
            let points: Vec<Point2D> = path
                .iter()
                .map(|&(r, c)| {
                    let (x, y) = streams_core.meta.transform.pixel_to_world(r, c);
                    Point2D::new(x, y)
                })
                .collect();
            if points.len() < 2 {
                continue;
            }

            let mut sfg = ShapefileGeometry::new(ShapeType::PolyLine);
            sfg.add_part(&points);
            output.add_record(sfg);

            let attrs = &graph.edge(i).attrs;
            output.attributes.add_record(
                vec![
                    FieldData::Int(i as i32),
                    FieldData::Int(attrs.strahler.unwrap_or(0) as i32),
                    FieldData::Int(attrs.hack_order.unwrap_or(0) as i32),
                    FieldData::Int(if attrs.mainstem == Some(true) { 1 } else { 0 }),
                    FieldData::Real(attrs.max_upstream_length.unwrap_or(0.0)),
                ],
                false,
            );

            if verbose {
                let progress = (100.0_f64 * i as f64 / segment_paths.len().max(1) as f64) as usize;
                println!("Progress: {}%", progress);
            }
        }

        let elapsed_time = get_formatted_elapsed_time(start);
        output.add_metadata_entry(format!(
            "Created by whitebox_tools\' {} tool",
            self.get_tool_name()
        ));
        output.add_metadata_entry(format!("Input d8 pointer file: {}", d8_file));
        output.add_metadata_entry(format!("Input streams file: {}", streams_file));
        output.add_metadata_entry(format!("Elapsed Time (excluding I/O): {}", elapsed_time));

        if verbose {
            println!("Saving data...")
        };
        let _ = match output.write() {
            Ok(_) => {
                if verbose {
                    println!("Output file written")
                }
            }
            Err(e) => return Err(e),
        };

        if verbose {
            println!(
                "{}",
                &format!("Elapsed Time (excluding I/O): {}", elapsed_time)
            );
        }

        Ok(())
    }
}
