//! Query object implementation.

use gl::types::*;
use lustre::backend::query::Query;

use crate::gl33::{count, GL33};

unsafe impl Query for GL33 {
  /// Without direct state access, the generated names only become objects once first used by
  /// `glBeginQuery` or `glQueryCounter`; there is no binding to force it earlier.
  fn create_queries(&mut self, target: GLenum, names: &mut [GLuint]) {
    unsafe {
      if self.dsa {
        gl::CreateQueries(target, count(names.len()), names.as_mut_ptr());
      } else {
        gl::GenQueries(count(names.len()), names.as_mut_ptr());
      }
    }
  }

  fn delete_queries(&mut self, names: &[GLuint]) {
    unsafe { gl::DeleteQueries(count(names.len()), names.as_ptr()) }
  }

  fn is_query(&mut self, name: GLuint) -> GLboolean {
    unsafe { gl::IsQuery(name) }
  }

  fn begin_query(&mut self, target: GLenum, name: GLuint) {
    unsafe { gl::BeginQuery(target, name) }
  }

  fn end_query(&mut self, target: GLenum) {
    unsafe { gl::EndQuery(target) }
  }

  fn query_counter(&mut self, name: GLuint) {
    unsafe { gl::QueryCounter(name, gl::TIMESTAMP) }
  }

  fn get_query_object_i64(&mut self, name: GLuint, pname: GLenum) -> GLint64 {
    let mut value = 0;
    unsafe { gl::GetQueryObjecti64v(name, pname, &mut value) };
    value
  }
}
